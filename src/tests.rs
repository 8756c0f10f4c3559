#[cfg(test)]
mod integration_tests {
    use crate::{
        digest, generate, generate_with_rng, CandidateFile, CaptureConstraints, CaptureStream, CharsetFlags, Config,
        DisplayCapture, ErrorSeverity, FileIntake, HashAlgorithm, IntakeConfig, Metrics, NoticeLevel, PasswordSpec,
        RecorderConfig, RecorderState, ScreenRecorder, SimulatedAudioConverter, SimulatedTask, SimulatedUrlShortener,
        SimulationConfig, Strength, ToolError, UrlShortener, AudioConverter, AudioFormat, DIGITS,
    };
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    const MB: usize = 1024 * 1024;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.intake.accept, vec!["*/*".to_string()]);
        assert_eq!(config.intake.max_size, 10 * MB as u64);
        assert_eq!(config.intake.max_files, 10);
        assert_eq!(config.password.length, 12);
        assert_eq!(config.simulation.shorten_delay, Duration::from_secs(1));
        assert_eq!(config.simulation.video_delay, Duration::from_secs(2));
        assert_eq!(config.simulation.convert_delay, Duration::from_secs(3));
        assert!(config.recorder.include_audio);
        assert_ok!(config.validate());
    }

    #[test]
    fn test_config_partial_json() {
        let config = assert_ok!(Config::from_json(r#"{ "intake": { "max_files": 2 } }"#));
        assert_eq!(config.intake.max_files, 2);
        assert_eq!(config.intake.max_size, 10 * MB as u64);
        assert_eq!(config.password.length, 12);
    }

    #[test]
    fn test_config_rejects_invalid_values() {
        let err = assert_err!(Config::from_json(r#"{ "intake": { "max_files": 0 } }"#));
        assert!(matches!(err, ToolError::ConfigurationError(_)));

        let err = assert_err!(Config::from_json(r#"{ "password": { "length": 80 } }"#));
        assert!(matches!(err, ToolError::ConfigurationError(_)));

        let err = assert_err!(Config::from_json("{ not json"));
        assert!(matches!(err, ToolError::SerializationError(_)));
    }

    #[test]
    fn test_error_recoverable() {
        assert!(ToolError::EmptyCharset.is_recoverable());
        assert!(ToolError::InvalidUrl("x".to_string()).is_recoverable());
        assert!(ToolError::CaptureDenied("user dismissed".to_string()).is_recoverable());
        assert!(!ToolError::ConfigurationError("bad".to_string()).is_recoverable());
        assert!(!ToolError::IoError("disk full".to_string()).is_recoverable());
    }

    #[test]
    fn test_error_severity_and_notice() {
        let rejected = ToolError::Validation {
            file_name: "big.bin".to_string(),
            reasons: vec!["too large".to_string()],
        };
        assert_eq!(rejected.severity(), ErrorSeverity::Low);
        let notice = rejected.notice();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.title, "File rejected");
        assert_eq!(notice.message, "big.bin: too large");

        let denied = ToolError::CaptureDenied("user dismissed".to_string());
        assert_eq!(denied.severity(), ErrorSeverity::Medium);
        assert_eq!(denied.notice().level, NoticeLevel::Error);

        assert_eq!(ToolError::IoError("x".to_string()).severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_sha256_is_deterministic() {
        let first = digest(HashAlgorithm::Sha256, b"toolbench");
        let second = digest(HashAlgorithm::Sha256, b"toolbench");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_simple32_of_empty_input() {
        assert_eq!(digest(HashAlgorithm::Simple32, b""), "00000000");
    }

    #[test]
    fn test_digits_only_password() {
        let charset = CharsetFlags {
            upper: false,
            lower: false,
            digit: true,
            symbol: false,
        };
        let spec = assert_ok!(PasswordSpec::new(12, charset));
        let password = assert_ok!(generate(&spec));
        assert_eq!(password.len(), 12);
        assert!(password.chars().all(|c| DIGITS.contains(c)));
    }

    #[test]
    fn test_empty_charset_is_reported() {
        let spec = assert_ok!(PasswordSpec::new(12, CharsetFlags::none()));
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(generate_with_rng(&spec, &mut rng), Err(ToolError::EmptyCharset)));
    }

    #[test]
    fn test_strength_thresholds() {
        assert_eq!(Strength::of_length(7), Strength::Weak);
        assert_eq!(Strength::of_length(8), Strength::Medium);
        assert_eq!(Strength::of_length(11), Strength::Medium);
        assert_eq!(Strength::of_length(12), Strength::Strong);
    }

    #[test]
    fn test_intake_rejects_oversized_file() {
        let mut intake = FileIntake::new(IntakeConfig::default());
        let outcome = intake.accept(vec![CandidateFile::new("big.bin", "application/octet-stream", vec![0; 11 * MB])]);

        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].file_name, "big.bin");
        assert!(intake.is_empty());
    }

    #[test]
    fn test_intake_count_limit_across_calls() {
        let mut intake = FileIntake::new(IntakeConfig {
            max_files: 1,
            ..Default::default()
        });

        let first = intake.accept(vec![CandidateFile::new("a.txt", "text/plain", b"a".to_vec())]);
        assert_eq!(first.accepted.len(), 1);

        let second = intake.accept(vec![CandidateFile::new("b.txt", "text/plain", b"b".to_vec())]);
        assert!(second.accepted.is_empty());
        assert_eq!(second.rejected.len(), 1);
        assert_eq!(intake.len(), 1);
        assert_eq!(intake.files()[0].name, "a.txt");
    }

    #[tokio::test]
    async fn test_intake_to_conversion() {
        let mut intake = FileIntake::new(IntakeConfig {
            accept: vec!["audio/*".to_string()],
            ..Default::default()
        });
        let outcome = intake.accept(vec![
            CandidateFile::new("song.wav", "audio/wav", vec![1, 2, 3, 4]),
            CandidateFile::new("cover.png", "image/png", vec![9]),
        ]);
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.rejected.len(), 1);

        let file = assert_ok!(intake.remove(0).ok_or("no file"));
        let converter = SimulatedAudioConverter::new(SimulationConfig::instant());
        let converted = assert_ok!(converter.convert(file, AudioFormat::Ogg).await);

        assert_eq!(converted.file_name, "song.ogg");
        assert_eq!(converted.mime_type, "audio/ogg");
        assert_eq!(converted.bytes.len(), 4);
        assert!(intake.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_shorten_tasks() {
        let shortener = Arc::new(SimulatedUrlShortener::new(SimulationConfig::instant()));
        let urls = ["https://example.com/one", "https://example.com/two", "ftp://example.com/three"];

        let tasks: Vec<_> = urls
            .iter()
            .map(|url| {
                let shortener = Arc::clone(&shortener);
                let url = url.to_string();
                SimulatedTask::spawn(async move { shortener.shorten(&url).await })
            })
            .collect();

        let results = futures::future::join_all(tasks.into_iter().map(|task| task.wait())).await;
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(matches!(results[2], Err(ToolError::InvalidUrl(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_task_never_resolves() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<()>();
        let task = SimulatedTask::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let _ = tx.send(());
            Ok(())
        });
        drop(task);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.recv().await.is_none());
    }

    struct CannedStream {
        chunks: VecDeque<Vec<u8>>,
    }

    #[async_trait]
    impl CaptureStream for CannedStream {
        async fn next_chunk(&mut self) -> Option<Vec<u8>> {
            self.chunks.pop_front()
        }

        fn finalize(&mut self) {}

        fn stop_tracks(&mut self) {}
    }

    struct CannedCapture;

    #[async_trait]
    impl DisplayCapture for CannedCapture {
        async fn open(&self, _constraints: CaptureConstraints) -> Result<Box<dyn CaptureStream>, ToolError> {
            Ok(Box::new(CannedStream {
                chunks: VecDeque::from(vec![b"frame-1;".to_vec(), b"frame-2".to_vec()]),
            }))
        }
    }

    #[tokio::test]
    async fn test_recorder_stop_while_idle() {
        let mut recorder = ScreenRecorder::new(Arc::new(CannedCapture), RecorderConfig::default());
        assert!(assert_ok!(recorder.stop().await).is_none());
        assert_eq!(recorder.state(), RecorderState::Idle);
    }

    #[tokio::test]
    async fn test_recorder_session_to_download() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = ScreenRecorder::new(Arc::new(CannedCapture), RecorderConfig::default());

        assert!(assert_ok!(recorder.download(dir.path()).await).is_none());

        assert_ok!(recorder.start().await);
        assert_eq!(recorder.state(), RecorderState::Recording);

        let recording = assert_ok!(recorder.stop().await).cloned().unwrap();
        assert_eq!(recorder.state(), RecorderState::Stopped);
        assert_eq!(recording.bytes, b"frame-1;frame-2".to_vec());
        assert_eq!(recording.mime_type, "video/webm");

        let path = assert_ok!(recorder.download(dir.path()).await).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), recording.bytes);
    }

    #[test]
    fn test_noop_metrics_accept_records() {
        let metrics = Metrics::noop();
        metrics.record_hash(128);
        metrics.record_encoding();
        metrics.record_password();
        metrics.record_intake(2, 1);
        metrics.record_simulated(Duration::from_millis(5));
        metrics.record_error(&ToolError::EmptyCharset);
    }
}
