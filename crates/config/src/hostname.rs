//! Local hostname resolution.

use tenantry_core::SystemError;

/// `HOST_NAME_MAX` is 64 on Linux and 255 on most other Unixes.
const HOSTNAME_MAX_LENGTH: usize = 256;

/// Return the hostname of the local machine.
#[cfg(unix)]
pub fn local_hostname() -> Result<String, SystemError> {
    let mut buf = [0u8; HOSTNAME_MAX_LENGTH];

    // SAFETY: `buf` is a valid writable buffer of the advertised length.
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if rc != 0 {
        return Err(SystemError::Hostname(
            std::io::Error::last_os_error().to_string(),
        ));
    }

    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    let hostname = std::str::from_utf8(&buf[..len])
        .map_err(|e| SystemError::Hostname(format!("hostname is not valid UTF-8: {e}")))?;

    if hostname.is_empty() {
        return Err(SystemError::Hostname("hostname is empty".into()));
    }

    Ok(hostname.to_string())
}

#[cfg(not(unix))]
pub fn local_hostname() -> Result<String, SystemError> {
    std::env::var("COMPUTERNAME").map_err(|e| SystemError::Hostname(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_non_empty_hostname() {
        let hostname = local_hostname().unwrap();
        assert!(!hostname.is_empty());
        assert!(!hostname.contains('\0'));
    }
}
