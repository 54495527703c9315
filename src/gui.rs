use std::hash::{Hash, Hasher};

use eframe::egui;

pub mod analysis_form;

/// Stable color per label, so a ticker keeps its color across runs.
pub fn str_to_color(s: &str) -> egui::Color32 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    s.hash(&mut hasher);
    let hash = hasher.finish();

    let hue = (hash % 360) as f64;
    let (r, g, b) = hsv::hsv_to_rgb(hue, 0.7, 0.95);

    egui::Color32::from_rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_to_color() {
        assert_eq!(str_to_color("PETR4.SA"), str_to_color("PETR4.SA"));
    }
}
