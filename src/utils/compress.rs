use std::io::Write;

use flate2::{
    Compression,
    write::{DeflateDecoder, DeflateEncoder},
};

use crate::error::SrResult;

pub fn deflate(data: &[u8]) -> SrResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

pub fn inflate(data: &[u8]) -> SrResult<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(Vec::new());
    decoder.write_all(data)?;
    Ok(decoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deflate_inflate() {
        let body = r#"{"chart":{"result":[{"timestamp":[1,2,3],"indicators":{"quote":[{"close":[10.0,10.1,10.2]}]}}],"error":null}}"#.repeat(8);

        let deflated = deflate(body.as_bytes()).unwrap();
        assert!(deflated.len() < body.len());

        let inflated = inflate(&deflated).unwrap();
        assert_eq!(inflated, body.as_bytes());
    }

    #[test]
    fn test_inflate_garbage() {
        assert!(inflate(&[0xff, 0xff, 0xff, 0xff]).is_err());
    }
}
