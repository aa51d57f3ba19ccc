//! Conversions between the textual (`STEAM_X:Y:Z`), 32-bit account id and
//! 64-bit Steam ID formats.

use crate::error::{ErrorKind, Result, SteamIdError};

/// Universe 1 (public), account type 1 (individual), instance 1.
const INDIVIDUAL_ACCOUNT_BASE: u64 = 0x0110_0001_0000_0000;

/// Parses `STEAM_X:Y:Z` into the 32-bit account id `Z * 2 + Y`.
///
/// A trailing `]` is ignored so ids copied out of `[STEAM_...]` brackets work.
pub fn convert_steam_id_txt_to_32(steam_id: &str) -> Result<u32> {
    parse_txt(steam_id).map_err(|reason| {
        ErrorKind::MalformedSteamId {
            input: steam_id.to_owned(),
            reason,
        }
        .into()
    })
}

fn parse_txt(steam_id: &str) -> std::result::Result<u32, SteamIdError> {
    let trimmed = steam_id.strip_suffix(']').unwrap_or(steam_id);

    let parts: Vec<&str> = trimmed.split(':').collect();
    let [_, auth_server, account] = parts.as_slice() else {
        return Err(SteamIdError::InvalidFormat);
    };

    let y: u32 = auth_server.parse()?;
    let z: u32 = account.parse()?;

    z.checked_mul(2)
        .and_then(|v| v.checked_add(y))
        .ok_or(SteamIdError::OutOfRange)
}

pub fn convert_steam_id32_to_64(steam_id32: u32) -> u64 {
    INDIVIDUAL_ACCOUNT_BASE + steam_id32 as u64
}

/// Inverse of [`convert_steam_id32_to_64`]. Ids outside the individual
/// account range wrap instead of failing.
pub fn convert_steam_id64_to_32(steam_id64: u64) -> u32 {
    steam_id64.wrapping_sub(INDIVIDUAL_ACCOUNT_BASE) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txt_to_32() {
        assert_eq!(52686539, convert_steam_id_txt_to_32("STEAM_0:1:26343269").unwrap());
        assert_eq!(52686539, convert_steam_id_txt_to_32("STEAM_0:1:26343269]").unwrap());
        assert_eq!(0, convert_steam_id_txt_to_32("STEAM_1:0:0").unwrap());
    }

    #[test]
    fn malformed_txt() {
        for input in [
            "STEAM_0:1:a",
            "STEAM_0:b:21643603",
            "STEAM_0:b",
            "STEAM_0:1",
            "",
            "STEAM_0:1:2:3",
            "STEAM_0:-1:2",
        ] {
            let err = convert_steam_id_txt_to_32(input).unwrap_err();
            match err.kind() {
                ErrorKind::MalformedSteamId { input: reported, .. } => assert_eq!(input, reported),
                other => panic!("unexpected error for {input:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn missing_segments_is_a_format_error() {
        let err = convert_steam_id_txt_to_32("STEAM_0:b").unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::MalformedSteamId {
                reason: SteamIdError::InvalidFormat,
                ..
            }
        ));
    }

    #[test]
    fn account_overflow() {
        let err = convert_steam_id_txt_to_32("STEAM_0:1:4294967295").unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::MalformedSteamId {
                reason: SteamIdError::OutOfRange,
                ..
            }
        ));
    }

    #[test]
    fn between_32_and_64() {
        assert_eq!(76561198012952267, convert_steam_id32_to_64(52686539));
        assert_eq!(52686539, convert_steam_id64_to_32(76561198012952267));

        for id in [0, 1, 52686539, u32::MAX] {
            assert_eq!(id, convert_steam_id64_to_32(convert_steam_id32_to_64(id)));
        }
    }

    #[test]
    fn out_of_range_64_wraps() {
        assert_eq!(u32::MAX, convert_steam_id64_to_32(INDIVIDUAL_ACCOUNT_BASE - 1));
        assert_eq!(5, convert_steam_id64_to_32(5u64.wrapping_add(INDIVIDUAL_ACCOUNT_BASE)));
    }
}
