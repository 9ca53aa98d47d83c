//! # ISO 7064 Mod 97-10
//!
//! Check digits are computed over the rearranged IBAN (BBAN, country code,
//! check digits) with letters expanded to two digits (`A` = 10 ... `Z` = 35).
//! The remainder is folded character by character, so no big integers are
//! needed.

/// Remainder modulo 97 of the rearranged form of `text`, or `None` if it
/// contains anything besides ASCII digits and uppercase letters.
pub fn mod97(text: &str) -> Option<u32> {
    text.chars().try_fold(0u32, |rem, c| match c {
        '0'..='9' => Some((rem * 10 + c.to_digit(10)?) % 97),
        'A'..='Z' => {
            let value = u32::from(c) - u32::from('A') + 10;
            Some((rem * 100 + value) % 97)
        }
        _ => None,
    })
}

/// The two check digits for `bban` in `country`.
pub fn check_digits(country: &str, bban: &str) -> Option<u32> {
    let rem = mod97(&format!("{bban}{country}00"))?;
    Some(98 - rem)
}

/// Whether `iban` (electronic form) carries correct check digits.
pub fn verify(iban: &str) -> bool {
    if iban.len() < 5 || !iban.is_ascii() {
        return false;
    }
    let (head, bban) = iban.split_at(4);
    mod97(&format!("{bban}{head}")) == Some(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reproduces_published_check_digits() {
        assert_eq!(check_digits("DE", "370400440532013000"), Some(89));
        assert_eq!(check_digits("NL", "ABNA0417164300"), Some(91));
    }

    #[test]
    fn verifies_published_ibans() {
        for iban in [
            "DE89370400440532013000",
            "AT611904300234573201",
            "CH9300762011623852957",
            "NL91ABNA0417164300",
        ] {
            assert!(verify(iban), "{iban}");
        }
        assert!(!verify("DE88370400440532013000"));
        assert!(!verify("DE8"));
    }

    #[test]
    fn rejects_foreign_characters() {
        assert_eq!(mod97("12a4"), None);
        assert_eq!(mod97("12-4"), None);
        assert_eq!(mod97(""), Some(0));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn computed_digits_verify(bank in 10_000_000u32..=99_999_999, account in 0u64..=9_999_999_999) {
            let bban = format!("{bank:08}{account:010}");
            let digits = check_digits("DE", &bban).unwrap();
            prop_assert!((2..=98).contains(&digits));
            let iban = format!("DE{digits:02}{bban}");
            prop_assert!(verify(&iban));
        }

        #[test]
        fn single_digit_change_is_detected(account in 0u64..=9_999_999_999, pos in 4usize..22) {
            let bban = format!("37040044{account:010}");
            let digits = check_digits("DE", &bban).unwrap();
            let iban = format!("DE{digits:02}{bban}");
            let mut bytes = iban.into_bytes();
            bytes[pos] = if bytes[pos] == b'9' { b'0' } else { bytes[pos] + 1 };
            let altered = String::from_utf8(bytes).unwrap();
            prop_assert!(!verify(&altered));
        }
    }
}
