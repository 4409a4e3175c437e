use crate::error::{WifiError, WifiResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;
use secrecy::{ExposeSecret, SecretString};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Strip characters Windows forbids in file names so the SSID can double as
/// the descriptor file name and the registered profile name.
pub fn sanitize_ssid(ssid: &str) -> String {
    ssid.chars()
        .filter(|c| {
            !c.is_control() && !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
        })
        .collect()
}

/// Build a WLANProfile descriptor for a WPA2-PSK/AES network.
///
/// The profile name uses the sanitized SSID; the `SSIDConfig` block carries
/// the SSID verbatim so the beacon match is exact.
pub fn create_profile_xml(ssid: &str, secret: &SecretString) -> String {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let _ = writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)));

    let mut wlan_profile = BytesStart::new("WLANProfile");
    wlan_profile.push_attribute((
        "xmlns",
        "http://www.microsoft.com/networking/WLAN/profile/v1",
    ));
    let _ = writer.write_event(Event::Start(wlan_profile));

    write_element(&mut writer, "name", &sanitize_ssid(ssid));

    let _ = writer.write_event(Event::Start(BytesStart::new("SSIDConfig")));
    let _ = writer.write_event(Event::Start(BytesStart::new("SSID")));
    write_element(&mut writer, "name", ssid);
    let _ = writer.write_event(Event::End(BytesEnd::new("SSID")));
    let _ = writer.write_event(Event::End(BytesEnd::new("SSIDConfig")));

    write_element(&mut writer, "connectionType", "ESS");
    write_element(&mut writer, "connectionMode", "auto");

    let _ = writer.write_event(Event::Start(BytesStart::new("MSM")));
    let _ = writer.write_event(Event::Start(BytesStart::new("security")));

    let _ = writer.write_event(Event::Start(BytesStart::new("authEncryption")));
    write_element(&mut writer, "authentication", "WPA2PSK");
    write_element(&mut writer, "encryption", "AES");
    write_element(&mut writer, "useOneX", "false");
    let _ = writer.write_event(Event::End(BytesEnd::new("authEncryption")));

    let _ = writer.write_event(Event::Start(BytesStart::new("sharedKey")));
    write_element(&mut writer, "keyType", "passPhrase");
    write_element(&mut writer, "protected", "false");
    write_element(&mut writer, "keyMaterial", secret.expose_secret());
    let _ = writer.write_event(Event::End(BytesEnd::new("sharedKey")));

    let _ = writer.write_event(Event::End(BytesEnd::new("security")));
    let _ = writer.write_event(Event::End(BytesEnd::new("MSM")));

    let _ = writer.write_event(Event::End(BytesEnd::new("WLANProfile")));

    String::from_utf8(writer.into_inner().into_inner()).unwrap_or_default()
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, name: &str, value: &str) {
    let _ = writer.write_event(Event::Start(BytesStart::new(name)));
    let _ = writer.write_event(Event::Text(BytesText::new(value)));
    let _ = writer.write_event(Event::End(BytesEnd::new(name)));
}

/// On-disk WLANProfile descriptor, removed when dropped.
///
/// A connect attempt hands the path to the OS and must not leave the file
/// behind on any exit path.
#[derive(Debug)]
pub struct TempProfile {
    path: PathBuf,
}

impl TempProfile {
    /// Write the descriptor for `ssid` into `dir`, named after the sanitized SSID.
    pub fn write(dir: &Path, ssid: &str, secret: &SecretString) -> WifiResult<Self> {
        let path = dir.join(format!("{}.xml", sanitize_ssid(ssid)));
        let xml = create_profile_xml(ssid, secret);
        fs::write(&path, xml).map_err(|source| WifiError::ProfileWrite {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempProfile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            log::warn!("could not remove {}: {e}", self.path.display());
        }
    }
}
