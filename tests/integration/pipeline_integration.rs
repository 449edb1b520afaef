use crate::fixtures::{self, TestFixtures, TWO_PAGES, ZHANG_SAN};
use pdfmask::config::{MaskColor, MaskConfig};
use pdfmask::error::Error;
use pdfmask::pipeline::{self, MaskJob};
use pdfmask::report::{ReportFormat, TargetStatus};
use pdfmask::utils::logging::{LogLevel, MemorySink};
use std::fs;

#[cfg(test)]
mod tests {
    use super::*;

    fn job(fx: &TestFixtures, pages: usize, layout: &str, targets: &[&str]) -> MaskJob {
        MaskJob::new(
            fx.pdf(pages),
            fx.layout(layout),
            targets.iter().map(|t| t.to_string()).collect(),
            fx.path("out/masked.pdf"),
        )
    }

    #[test]
    fn test_single_occurrence_masked() {
        let fx = TestFixtures::new();
        let job = job(&fx, 1, ZHANG_SAN, &["张三"]);
        let original = fs::read(&job.pdf_path).unwrap();
        let sink = MemorySink::new();

        let report = pipeline::run(&job, &sink).unwrap();

        assert_eq!(report.count_for("张三"), 1);
        assert_eq!(report.total, 1);
        assert!(job.output_path.is_file());
        // q, original, Q, overlay
        assert_eq!(fixtures::page_contents(&job.output_path, 0).len(), 4);
        assert_eq!(fs::read(&job.pdf_path).unwrap(), original);
        assert!(sink.contains("✓ '张三': 1 occurrence(s)"));
        assert!(sink.contains("Total masked: 1"));
    }

    #[test]
    fn test_no_match_output_is_identical_copy() {
        let fx = TestFixtures::new();
        let job = job(&fx, 1, ZHANG_SAN, &["李"]);
        let sink = MemorySink::new();

        let report = pipeline::run(&job, &sink).unwrap();

        assert_eq!(report.total, 0);
        assert_eq!(report.outcome("李").unwrap().status, TargetStatus::NotFound);
        assert_eq!(fs::read(&job.output_path).unwrap(), fs::read(&job.pdf_path).unwrap());
        assert!(sink.messages_at(LogLevel::Warn).iter().any(|m| m.contains("not found")));
    }

    #[test]
    fn test_suffixed_keys_match() {
        let fx = TestFixtures::new();
        let json = r#"{
            "张": {"bbox": [10, 10, 20, 20], "page_index": 0},
            "三": {"bbox": [20, 10, 30, 20], "page_index": 0},
            "张_1": {"bbox": [10, 40, 20, 50], "page_index": 0},
            "三_1": {"bbox": [20, 40, 30, 50], "page_index": 0}
        }"#;
        let job = job(&fx, 1, json, &["张三"]);

        let report = pipeline::run(&job, &MemorySink::new()).unwrap();

        assert_eq!(report.count_for("张三"), 2);
        // q, original, Q, two overlays
        assert_eq!(fixtures::page_contents(&job.output_path, 0).len(), 5);
    }

    #[test]
    fn test_missing_pdf_is_fatal() {
        let fx = TestFixtures::new();
        let job = MaskJob::new(
            fx.path("missing.pdf"),
            fx.layout(ZHANG_SAN),
            vec!["张三".into()],
            fx.path("out.pdf"),
        );

        let err = pipeline::run(&job, &MemorySink::new()).unwrap_err();

        assert!(matches!(err, Error::InputNotFound(ref p) if p.ends_with("missing.pdf")));
        assert!(!job.output_path.exists());
    }

    #[test]
    fn test_missing_or_malformed_layout_is_fatal() {
        let fx = TestFixtures::new();
        let mut job = MaskJob::new(
            fx.pdf(1),
            fx.path("missing.json"),
            vec!["张三".into()],
            fx.path("out.pdf"),
        );
        assert!(matches!(
            pipeline::run(&job, &MemorySink::new()),
            Err(Error::InputNotFound(_))
        ));

        job.layout_path = fx.layout("{ not json");
        assert!(matches!(
            pipeline::run(&job, &MemorySink::new()),
            Err(Error::LayoutError(_))
        ));
        assert!(!job.output_path.exists());
    }

    #[test]
    fn test_two_targets_across_pages() {
        let fx = TestFixtures::new();
        let job = job(&fx, 2, TWO_PAGES, &["张三", "李四"]);
        let sink = MemorySink::new();

        let report = pipeline::run(&job, &sink).unwrap();

        assert_eq!(report.count_for("张三"), 2);
        assert_eq!(report.count_for("李四"), 0);
        assert_eq!(report.total, 2);
        assert_eq!(fixtures::page_contents(&job.output_path, 0).len(), 4);
        assert_eq!(fixtures::page_contents(&job.output_path, 1).len(), 4);
        assert!(sink.contains("Total masked: 2"));
    }

    #[test]
    fn test_out_of_range_page_fails_only_that_target() {
        let fx = TestFixtures::new();
        let json = r#"{
            "张": {"bbox": [10, 10, 20, 20], "page_index": 0},
            "三": {"bbox": [20, 10, 30, 20], "page_index": 0},
            "王": {"bbox": [10, 10, 20, 20], "page_index": 7}
        }"#;
        let job = job(&fx, 1, json, &["王", "张三"]);

        let report = pipeline::run(&job, &MemorySink::new()).unwrap();

        assert!(matches!(report.targets[0].status, TargetStatus::Failed { .. }));
        assert_eq!(report.count_for("张三"), 1);
        assert_eq!(report.total, 1);
        assert!(job.output_path.is_file());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let fx = TestFixtures::new();
        let config = MaskConfig {
            dry_run: true,
            ..Default::default()
        };
        let job = job(&fx, 2, TWO_PAGES, &["张三"]).with_config(config);
        let sink = MemorySink::new();

        let report = pipeline::run(&job, &sink).unwrap();

        assert_eq!(report.total, 2);
        assert!(report.dry_run);
        assert!(!job.output_path.exists());
        assert!(sink.contains("dry run"));
    }

    #[test]
    fn test_unwritable_output_leaves_nothing_behind() {
        let fx = TestFixtures::new();
        let blocker = fx.path("blocker");
        fs::write(&blocker, b"not a directory").unwrap();
        let job = MaskJob::new(
            fx.pdf(1),
            fx.layout(ZHANG_SAN),
            vec!["张三".into()],
            blocker.join("masked.pdf"),
        );

        let err = pipeline::run(&job, &MemorySink::new()).unwrap_err();

        assert!(matches!(err, Error::OutputError { .. }));
        assert_eq!(fs::read(&blocker).unwrap(), b"not a directory");
    }

    #[test]
    fn test_rejected_jobs() {
        let fx = TestFixtures::new();
        let pdf = fx.pdf(1);
        let layout = fx.layout(ZHANG_SAN);

        let no_targets = MaskJob::new(&pdf, &layout, vec![], fx.path("out.pdf"));
        assert!(matches!(
            pipeline::run(&no_targets, &MemorySink::new()),
            Err(Error::InvalidConfiguration(_))
        ));

        let in_place = MaskJob::new(&pdf, &layout, vec!["张三".into()], &pdf);
        assert!(matches!(
            pipeline::run(&in_place, &MemorySink::new()),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_custom_color_and_report_file() {
        let fx = TestFixtures::new();
        let config = MaskConfig {
            color: MaskColor::new(1.0, 1.0, 1.0).unwrap(),
            ..Default::default()
        };
        let job = job(&fx, 1, ZHANG_SAN, &["张三", "李"]).with_config(config);

        let report = pipeline::run(&job, &MemorySink::new()).unwrap();
        let report_path = fx.path("report.json");
        report.write_to(&report_path, ReportFormat::Json).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(value["total"], 1);
        assert_eq!(value["targets"][0]["status"], "found");
        assert_eq!(value["targets"][1]["status"], "not_found");
    }
}
