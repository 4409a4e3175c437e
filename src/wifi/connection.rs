use crate::config;
use crate::error::WifiResult;
use crate::wifi::command::{CommandRunner, NetshRunner, decode_output};
use crate::wifi::profile::{TempProfile, sanitize_ssid};
use crate::wifi::types::ConnectionState;
use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;

/// The state checks and connect requests the monitor needs from the
/// wireless stack. Kept narrow so tests can script the stack's answers.
pub trait NetworkControl {
    fn is_connected(&self, target: &str) -> bool;
    fn connect(&self, ssid: &str, secret: &SecretString) -> bool;
}

/// Extract the connected SSID from `netsh wlan show interfaces` output.
///
/// The first line carrying an `SSID` field wins; the `BSSID` line names the
/// access point address and is not it. The value is whatever follows the
/// first `:` on that line, trimmed.
pub fn parse_connected_ssid(output: &str) -> Option<String> {
    let line = output
        .lines()
        .find(|line| line.contains("SSID") && !line.contains("BSSID"))?;
    let (_, value) = line.split_once(':')?;
    let ssid = value.trim();
    (!ssid.is_empty()).then(|| ssid.to_string())
}

/// Queries connection state and issues connect requests against the OS
/// wireless stack.
pub struct NetworkAdapter<R = NetshRunner> {
    runner: R,
    profile_dir: PathBuf,
    poll_interval: Duration,
}

impl NetworkAdapter {
    pub fn new() -> Self {
        Self::with_runner(NetshRunner, std::env::temp_dir())
    }
}

impl Default for NetworkAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> NetworkAdapter<R> {
    pub fn with_runner(runner: R, profile_dir: PathBuf) -> Self {
        Self {
            runner,
            profile_dir,
            poll_interval: Duration::from_secs(config::CONNECT_POLL_INTERVAL_SECS),
        }
    }

    /// Current link state, queried fresh on every call.
    pub fn connection_state(&self) -> ConnectionState {
        let bytes = match self.runner.run(&["wlan", "show", "interfaces"]) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("interface query failed: {e}");
                return ConnectionState::Unknown(e.to_string());
            }
        };
        let text = match decode_output(&bytes) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("interface query output undecodable: {e}");
                return ConnectionState::Unknown(e.to_string());
            }
        };
        match parse_connected_ssid(&text) {
            Some(ssid) => ConnectionState::Connected(ssid),
            None => ConnectionState::Disconnected,
        }
    }

    /// Whether the interface is currently associated with exactly `target`.
    /// Any failure along the way reads as "not connected".
    pub fn is_connected(&self, target: &str) -> bool {
        self.connection_state().is_connected_to(target)
    }

    /// Register a profile for `ssid` and try to join it, verifying with a
    /// bounded once-per-second poll. Never raises; a failed attempt is `false`.
    pub fn connect(&self, ssid: &str, secret: &SecretString) -> bool {
        match self.try_connect(ssid, secret) {
            Ok(joined) => joined,
            Err(e) => {
                log::warn!("connect to {ssid} failed: {e}");
                false
            }
        }
    }

    fn try_connect(&self, ssid: &str, secret: &SecretString) -> WifiResult<bool> {
        let safe_ssid = sanitize_ssid(ssid);
        let descriptor = TempProfile::write(&self.profile_dir, ssid, secret)?;

        // Exit codes of the four mutations are ignored on purpose; the poll
        // below is the only success signal.
        let name_arg = format!("name={safe_ssid}");
        let filename_arg = format!("filename={}", descriptor.path().display());
        let _ = self.runner.run(&["wlan", "delete", "profile", &name_arg]);
        let _ = self.runner.run(&["wlan", "add", "profile", &filename_arg]);
        let _ = self.runner.run(&["wlan", "disconnect"]);
        let _ = self.runner.run(&["wlan", "connect", &name_arg]);

        for _ in 0..config::CONNECT_POLL_ATTEMPTS {
            if self.is_connected(ssid) {
                return Ok(true);
            }
            std::thread::sleep(self.poll_interval);
        }
        Ok(false)
    }
}

impl<R: CommandRunner> NetworkControl for NetworkAdapter<R> {
    fn is_connected(&self, target: &str) -> bool {
        NetworkAdapter::is_connected(self, target)
    }

    fn connect(&self, ssid: &str, secret: &SecretString) -> bool {
        NetworkAdapter::connect(self, ssid, secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WifiError;
    use std::cell::RefCell;
    use std::io;
    use std::path::Path;

    const INTERFACES_OUTPUT: &str = "\
There is 1 interface on the system:

    Name                   : Wi-Fi
    Description            : Intel(R) Wi-Fi 6 AX201
    State                  : connected
    SSID                   : HomeNet
    BSSID                  : aa:bb:cc:dd:ee:ff
    Radio type             : 802.11ax
";

    /// Scripted `netsh`: records every invocation, optionally failing them
    /// all, and checks whether the descriptor file exists when handed over.
    #[derive(Default)]
    struct MockRunner {
        interfaces_output: Option<String>,
        fail_all: bool,
        calls: RefCell<Vec<String>>,
        descriptor_present_at_add: RefCell<Option<bool>>,
    }

    impl CommandRunner for MockRunner {
        fn run(&self, args: &[&str]) -> WifiResult<Vec<u8>> {
            let joined = args.join(" ");
            self.calls.borrow_mut().push(joined.clone());

            if let Some(arg) = args.iter().find(|a| a.starts_with("filename=")) {
                let path = Path::new(&arg["filename=".len()..]);
                *self.descriptor_present_at_add.borrow_mut() = Some(path.exists());
            }

            if self.fail_all {
                return Err(WifiError::CommandFailed {
                    command: joined,
                    source: io::Error::new(io::ErrorKind::NotFound, "netsh not found"),
                });
            }
            if args == ["wlan", "show", "interfaces"] {
                return match &self.interfaces_output {
                    Some(text) => Ok(text.clone().into_bytes()),
                    None => Ok(b"There is 1 interface on the system:\n    State : disconnected\n".to_vec()),
                };
            }
            Ok(Vec::new())
        }
    }

    fn adapter(runner: MockRunner, dir: &Path) -> NetworkAdapter<MockRunner> {
        let mut adapter = NetworkAdapter::with_runner(runner, dir.to_path_buf());
        adapter.poll_interval = Duration::ZERO;
        adapter
    }

    #[test]
    fn parse_skips_bssid_and_takes_value_after_colon() {
        assert_eq!(
            parse_connected_ssid(INTERFACES_OUTPUT),
            Some("HomeNet".to_string())
        );
        // same text, same verdict
        assert_eq!(
            parse_connected_ssid(INTERFACES_OUTPUT),
            Some("HomeNet".to_string())
        );
    }

    #[test]
    fn parse_ignores_bssid_when_it_comes_first() {
        let output = "    BSSID : aa:bb:cc\n    SSID : CafeNet\n";
        assert_eq!(parse_connected_ssid(output), Some("CafeNet".to_string()));
    }

    #[test]
    fn parse_gives_up_on_malformed_ssid_line() {
        assert_eq!(parse_connected_ssid("    SSID no separator\n"), None);
        assert_eq!(parse_connected_ssid("    State : disconnected\n"), None);
        assert_eq!(parse_connected_ssid("    SSID : \n"), None);
    }

    #[test]
    fn is_connected_requires_exact_match() {
        let dir = tempfile::tempdir().unwrap();
        let runner = MockRunner {
            interfaces_output: Some(INTERFACES_OUTPUT.to_string()),
            ..Default::default()
        };
        let adapter = adapter(runner, dir.path());
        assert!(adapter.is_connected("HomeNet"));
        assert!(!adapter.is_connected("Home"));
        assert!(!adapter.is_connected("homenet"));
    }

    #[test]
    fn query_failure_reads_as_unknown_and_not_connected() {
        let dir = tempfile::tempdir().unwrap();
        let runner = MockRunner {
            fail_all: true,
            ..Default::default()
        };
        let adapter = adapter(runner, dir.path());
        assert!(matches!(
            adapter.connection_state(),
            ConnectionState::Unknown(_)
        ));
        assert!(!adapter.is_connected("HomeNet"));
    }

    #[test]
    fn connect_exhausts_poll_attempts_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let secret = SecretString::from("pw".to_string());
        let adapter = adapter(MockRunner::default(), dir.path());

        assert!(!adapter.connect("HomeNet", &secret));

        let calls = adapter.runner.calls.borrow();
        let polls = calls.iter().filter(|c| *c == "wlan show interfaces").count();
        assert_eq!(polls, config::CONNECT_POLL_ATTEMPTS as usize);
        assert_eq!(calls[0], "wlan delete profile name=HomeNet");
        assert!(calls[1].starts_with("wlan add profile filename="));
        assert_eq!(calls[2], "wlan disconnect");
        assert_eq!(calls[3], "wlan connect name=HomeNet");
        drop(calls);

        // descriptor existed while netsh was asked to register it, gone now
        assert_eq!(*adapter.runner.descriptor_present_at_add.borrow(), Some(true));
        assert!(!dir.path().join("HomeNet.xml").exists());
    }

    #[test]
    fn connect_succeeds_fast_on_first_positive_poll() {
        let dir = tempfile::tempdir().unwrap();
        let secret = SecretString::from("pw".to_string());
        let runner = MockRunner {
            interfaces_output: Some(INTERFACES_OUTPUT.to_string()),
            ..Default::default()
        };
        let adapter = adapter(runner, dir.path());

        assert!(adapter.connect("HomeNet", &secret));

        let calls = adapter.runner.calls.borrow();
        let polls = calls.iter().filter(|c| *c == "wlan show interfaces").count();
        assert_eq!(polls, 1);
        assert!(!dir.path().join("HomeNet.xml").exists());
    }

    #[test]
    fn failed_spawns_still_remove_descriptor_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let secret = SecretString::from("pw".to_string());
        let runner = MockRunner {
            fail_all: true,
            ..Default::default()
        };
        let adapter = adapter(runner, dir.path());

        assert!(!adapter.connect("HomeNet", &secret));
        // every invocation failed, yet the attempt ran to completion and the
        // descriptor is gone
        assert_eq!(*adapter.runner.descriptor_present_at_add.borrow(), Some(true));
        assert!(!dir.path().join("HomeNet.xml").exists());
        assert!(dir.path().read_dir().unwrap().next().is_none());
    }
}
