use crate::fixtures::{TestFixtures, TWO_PAGES};
use pdfmask::config::MaskConfig;
use pdfmask::report::ReportFormatter;
use pdfmask::{find_occurrences, normalize_char, BBox, LayoutDocument};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_strips_numeric_suffix_only() {
        assert_eq!(normalize_char("张_12"), "张");
        assert_eq!(normalize_char("_"), "_");
        assert_eq!(normalize_char("_3"), "_3");
        assert_eq!(normalize_char("a_b"), "a_b");
    }

    #[test]
    fn test_layout_file_roundtrip_through_matcher() {
        let json = r#"{
            "甲": {"bbox": [0, 0, 10, 10], "page_index": 0},
            "方": {"bbox": [10, 2, 20, 12], "page_index": 0},
            "甲_1": {"bbox": [0, 30, 10, 40], "page_index": 0},
            "方_1": {"bbox": [0, 50, 10, 60], "page_index": 1}
        }"#;
        let layout = LayoutDocument::from_json_str(json).unwrap();

        let found = find_occurrences(&layout, "甲方");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].bbox, BBox::new(0.0, 0.0, 20.0, 12.0));

        // 甲 ends page 0 and 方 starts page 1: no match across the boundary
        assert!(find_occurrences(&layout, "甲方甲方").is_empty());
        assert_eq!(find_occurrences(&layout, "方").len(), 2);
    }

    #[test]
    fn test_overlapping_windows_all_reported() {
        let json = r#"{
            "a": {"bbox": [0, 0, 1, 1], "page_index": 0},
            "a_1": {"bbox": [1, 0, 2, 1], "page_index": 0},
            "a_2": {"bbox": [2, 0, 3, 1], "page_index": 0}
        }"#;
        let layout = LayoutDocument::from_json_str(json).unwrap();
        let found = find_occurrences(&layout, "aa");
        assert_eq!(found.len(), 2);
        assert_eq!((found[1].start, found[1].end), (1, 3));
    }

    #[test]
    fn test_config_file_formats() {
        let json = MaskConfig::parse(r#"{"color": [0, 0, 1], "padding": 0.15}"#).unwrap();
        let yaml = MaskConfig::parse("color: blue\npadding: 0.15\n").unwrap();
        assert_eq!(json, yaml);
        assert!(MaskConfig::parse("padding: 3").is_err());
    }

    #[test]
    fn test_field_listing_from_layout_file() {
        let fx = TestFixtures::new();
        let layout = LayoutDocument::load(&fx.layout(TWO_PAGES)).unwrap();

        let listing = ReportFormatter::field_listing(&layout, Some("三"));
        assert!(listing.contains("7 field(s) in layout"));
        assert!(listing.contains("Matching fields (2):"));
        assert!(listing.contains("  2. page 1 | '三_1' | bbox: [112.00, 302.00, 124.00, 316.00]"));
    }
}
