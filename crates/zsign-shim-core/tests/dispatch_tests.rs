//! Process-level tests for the zsign dispatcher.
//!
//! These run real child processes (`/bin/sh`, `/bin/echo`) in place of zsign.

#![cfg(unix)]

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use zsign_shim_core::{
    Dispatcher, PlatformKey, ProcessDispatcher, ShimConfig, SignOptions, ZSign, ZsignError,
};

fn sh() -> ProcessDispatcher {
    ProcessDispatcher::new("/bin/sh", ShimConfig::default())
}

fn script(body: &str) -> Vec<OsString> {
    vec!["-c".into(), body.into()]
}

// =============================================================================
// Output relay
// =============================================================================

mod relay {
    use super::*;

    #[tokio::test]
    async fn stdout_is_returned() {
        let out = sh().invoke(script("echo out; echo err >&2")).await.unwrap();
        assert_eq!(out, "out\n");
    }

    #[tokio::test]
    async fn stderr_returned_when_stdout_empty() {
        let out = sh().invoke(script("echo oops >&2")).await.unwrap();
        assert_eq!(out, "oops\n");
    }

    #[tokio::test]
    async fn empty_output_is_ok() {
        let out = sh().invoke(script("true")).await.unwrap();
        assert_eq!(out, "");
    }
}

// =============================================================================
// Argument passing
// =============================================================================

mod arguments {
    use super::*;

    #[tokio::test]
    async fn arguments_reach_binary_verbatim() {
        let mut args = script(r#"printf '%s\n' "$@""#);
        args.push("sh".into());
        args.extend(
            SignOptions::new()
                .bundle_name("My App; touch /tmp/pwned")
                .output("dir with spaces/out.ipa")
                .to_args("$(whoami).ipa"),
        );

        let out = sh().invoke(args).await.unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "--output",
                "dir with spaces/out.ipa",
                "--bundle_name",
                "My App; touch /tmp/pwned",
                "$(whoami).ipa",
            ]
        );
    }

    #[tokio::test]
    async fn debug_flag_does_not_change_output() {
        let config = ShimConfig::default().with_debug(true);
        let zsign = ZSign::with_dispatcher(ProcessDispatcher::new("/bin/echo", config));

        let out = zsign
            .sign("in.ipa", &SignOptions::new().bundle_id("com.example.app"))
            .await
            .unwrap();
        assert_eq!(out, "--bundle_id com.example.app in.ipa\n");
    }
}

// =============================================================================
// Failures
// =============================================================================

mod failures {
    use super::*;

    #[tokio::test]
    async fn non_zero_exit_is_error() {
        let err = sh()
            .invoke(script("echo partial; echo bad >&2; exit 3"))
            .await
            .unwrap_err();

        match err {
            ZsignError::Exit {
                code,
                stdout,
                stderr,
            } => {
                assert_eq!(code, Some(3));
                assert_eq!(stdout, "partial\n");
                assert_eq!(stderr, "bad\n");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let dispatcher =
            ProcessDispatcher::new("/nonexistent/bin/zsign_linux_x64", ShimConfig::default());
        let err = dispatcher.invoke(vec!["-v".into()]).await.unwrap_err();
        assert!(matches!(err, ZsignError::Spawn { .. }));
    }

    #[tokio::test]
    async fn timeout_kills_process() {
        let config = ShimConfig::default().with_timeout(Some(Duration::from_millis(200)));
        let dispatcher = ProcessDispatcher::new("/bin/sh", config);

        let started = std::time::Instant::now();
        let err = dispatcher.invoke(script("sleep 10")).await.unwrap_err();

        assert!(matches!(err, ZsignError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}

// =============================================================================
// Concurrency
// =============================================================================

mod concurrency {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_invocations_are_isolated() {
        let zsign = Arc::new(ZSign::with_dispatcher(ProcessDispatcher::new(
            "/bin/echo",
            ShimConfig::default(),
        )));

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let zsign = Arc::clone(&zsign);
                tokio::spawn(async move {
                    let options = SignOptions::new().bundle_id(format!("com.example.app{i}"));
                    let out = zsign.sign(format!("in-{i}.ipa"), &options).await;
                    (i, out)
                })
            })
            .collect();

        for handle in handles {
            let (i, out) = handle.await.unwrap();
            assert_eq!(
                out.unwrap(),
                format!("--bundle_id com.example.app{i} in-{i}.ipa\n")
            );
        }
    }
}

// =============================================================================
// Resolution
// =============================================================================

mod resolution {
    use super::*;

    #[tokio::test]
    async fn injected_locator_drives_dispatch() {
        if PlatformKey::detect().is_err() {
            return;
        }

        let locator = |_key: PlatformKey| std::path::PathBuf::from("/bin/echo");
        let zsign = ZSign::with_locator(ShimConfig::default(), &locator).unwrap();

        let out = zsign.get_version().await.unwrap();
        assert_eq!(out.trim(), "-v");
    }

    #[test]
    fn convention_locator_requires_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShimConfig::default().with_bin_base(dir.path().join("zsign"));

        let err = ZSign::new(config).err().expect("resolution should fail");
        assert!(err.is_startup());
    }
}
