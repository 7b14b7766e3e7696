//! Dashboard uid derivation.
//!
//! The remote platform limits uids to [`MAX_UID_LEN`] characters. A uid is
//! the document's own `uid` when present, otherwise a hash of its title; the
//! run-scoped suffix is appended and over-long results are re-hashed. The
//! result is a pure function of its inputs, so repeated runs address the same
//! remote dashboard.

use sha2::{Digest, Sha256};

pub const MAX_UID_LEN: usize = 40;

/// Where the base identifier comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UidSource<'a> {
    /// The document carries its own uid.
    Provided(&'a str),
    /// No uid; derive one from the title.
    Title(&'a str),
}

/// First [`MAX_UID_LEN`] hex characters of SHA-256(`input`).
pub fn generate_unique_id(input: &str) -> String {
    let digest = hex::encode(Sha256::digest(input.as_bytes()));
    digest[..MAX_UID_LEN].to_string()
}

/// Final uid for `source` with an optional `suffix`; always ≤ [`MAX_UID_LEN`].
pub fn resolve_uid(source: UidSource<'_>, suffix: Option<&str>) -> String {
    let mut uid = match source {
        UidSource::Provided(uid) => uid.to_string(),
        UidSource::Title(title) => generate_unique_id(title),
    };
    if let Some(suffix) = suffix {
        uid.push_str(suffix);
    }
    if uid.len() > MAX_UID_LEN {
        uid = generate_unique_id(&uid);
    }
    uid
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn unique_id_is_stable_and_bounded() {
        let a = generate_unique_id("Service Overview");
        let b = generate_unique_id("Service Overview");
        assert_eq!(a, b);
        assert_eq!(a.len(), MAX_UID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, generate_unique_id("Service Overview 2"));
    }

    #[test]
    fn known_digest_prefix() {
        // sha256("abc") = ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad
        assert_eq!(
            generate_unique_id("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a3"
        );
    }

    #[rstest]
    #[case(UidSource::Provided("x"), None, "x")]
    #[case(UidSource::Provided("x"), Some("-pr-1"), "x-pr-1")]
    fn provided_uid_is_kept(
        #[case] source: UidSource<'static>,
        #[case] suffix: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(resolve_uid(source, suffix), expected);
    }

    #[test]
    fn title_uid_with_suffix_is_rehashed() {
        let base = generate_unique_id("T");
        let uid = resolve_uid(UidSource::Title("T"), Some("-pr-1"));
        assert_eq!(uid, generate_unique_id(&format!("{base}-pr-1")));
        assert_eq!(uid.len(), MAX_UID_LEN);
    }

    #[test]
    fn title_uid_without_suffix_is_the_hash() {
        assert_eq!(
            resolve_uid(UidSource::Title("T"), None),
            generate_unique_id("T")
        );
    }

    #[test]
    fn overlong_provided_uid_is_hashed() {
        let long = "a".repeat(41);
        let uid = resolve_uid(UidSource::Provided(&long), None);
        assert_eq!(uid, generate_unique_id(&long));
    }

    #[test]
    fn exactly_forty_chars_is_kept() {
        let exact = "b".repeat(40);
        assert_eq!(resolve_uid(UidSource::Provided(&exact), None), exact);
    }
}
