use crate::error::{WifiError, WifiResult};
use encoding_rs::{GBK, UTF_8};
use std::process::{Command, Stdio};

/// Invokes the OS network-configuration command and captures its raw output.
///
/// Exit codes are deliberately not part of the contract: callers that care
/// about success infer it from a later state check, not from the command.
pub trait CommandRunner {
    /// Run `netsh` with the given arguments, returning captured output bytes.
    fn run(&self, args: &[&str]) -> WifiResult<Vec<u8>>;
}

/// Runs the real `netsh` binary with its console window suppressed.
#[derive(Debug, Default, Clone)]
pub struct NetshRunner;

impl CommandRunner for NetshRunner {
    fn run(&self, args: &[&str]) -> WifiResult<Vec<u8>> {
        let mut command = Command::new("netsh");
        command.args(args).stdin(Stdio::null());
        hide_console_window(&mut command);

        let output = command.output().map_err(|source| WifiError::CommandFailed {
            command: format!("netsh {}", args.join(" ")),
            source,
        })?;

        // stderr folds in after stdout; the line scan sees one document
        let mut bytes = output.stdout;
        bytes.extend_from_slice(&output.stderr);
        Ok(bytes)
    }
}

// Keeps each netsh invocation from flashing a console window.
#[cfg(windows)]
fn hide_console_window(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_console_window(_command: &mut Command) {}

/// Decode command output with the candidate encodings in priority order.
/// The first encoding that decodes without errors wins.
pub fn decode_output(bytes: &[u8]) -> WifiResult<String> {
    for encoding in [UTF_8, GBK] {
        let (text, _, had_errors) = encoding.decode(bytes);
        if !had_errors {
            return Ok(text.into_owned());
        }
    }
    Err(WifiError::UndecodableOutput)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8_first() {
        let text = decode_output("SSID : 咖啡厅".as_bytes()).unwrap();
        assert_eq!(text, "SSID : 咖啡厅");
    }

    #[test]
    fn falls_back_to_gbk() {
        // "中文" in GBK; not valid UTF-8
        let bytes = [0xd6, 0xd0, 0xce, 0xc4];
        let text = decode_output(&bytes).unwrap();
        assert_eq!(text, "中文");
    }

    #[test]
    fn rejects_undecodable_bytes() {
        let result = decode_output(&[0xff, 0xff]);
        assert!(matches!(result, Err(WifiError::UndecodableOutput)));
    }
}
