//! Version comparison utilities

use std::cmp::Ordering;

/// Compare two version (or release) strings segment by segment.
///
/// Follows rpm's `rpmvercmp`: separators are skipped, numeric segments
/// compare numerically and beat alphabetic ones, `~` sorts before
/// everything (even the end of the string) and `^` sorts after the end of
/// the string but before any other segment.
pub fn rpmvercmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let one = a.as_bytes();
    let two = b.as_bytes();
    let (mut i, mut j) = (0usize, 0usize);

    while i < one.len() || j < two.len() {
        while i < one.len() && is_separator(one[i]) {
            i += 1;
        }
        while j < two.len() && is_separator(two[j]) {
            j += 1;
        }

        let one_tilde = one.get(i) == Some(&b'~');
        let two_tilde = two.get(j) == Some(&b'~');
        if one_tilde || two_tilde {
            if !one_tilde {
                return Ordering::Greater;
            }
            if !two_tilde {
                return Ordering::Less;
            }
            i += 1;
            j += 1;
            continue;
        }

        let one_caret = one.get(i) == Some(&b'^');
        let two_caret = two.get(j) == Some(&b'^');
        if one_caret || two_caret {
            if i >= one.len() {
                return Ordering::Less;
            }
            if j >= two.len() {
                return Ordering::Greater;
            }
            if !one_caret {
                return Ordering::Greater;
            }
            if !two_caret {
                return Ordering::Less;
            }
            i += 1;
            j += 1;
            continue;
        }

        if i >= one.len() || j >= two.len() {
            break;
        }

        let numeric = one[i].is_ascii_digit();
        let (start_one, start_two) = (i, j);
        if numeric {
            while i < one.len() && one[i].is_ascii_digit() {
                i += 1;
            }
            while j < two.len() && two[j].is_ascii_digit() {
                j += 1;
            }
        } else {
            while i < one.len() && one[i].is_ascii_alphabetic() {
                i += 1;
            }
            while j < two.len() && two[j].is_ascii_alphabetic() {
                j += 1;
            }
        }

        let seg_one = &one[start_one..i];
        let seg_two = &two[start_two..j];

        // Segments of different types: numeric is newer
        if seg_two.is_empty() {
            return if numeric { Ordering::Greater } else { Ordering::Less };
        }

        let ord = if numeric {
            let seg_one = trim_leading_zeros(seg_one);
            let seg_two = trim_leading_zeros(seg_two);
            seg_one.len().cmp(&seg_two.len()).then_with(|| seg_one.cmp(seg_two))
        } else {
            seg_one.cmp(seg_two)
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    match (i >= one.len(), j >= two.len()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        _ => Ordering::Greater,
    }
}

fn is_separator(c: u8) -> bool {
    !c.is_ascii_alphanumeric() && c != b'~' && c != b'^'
}

fn trim_leading_zeros(segment: &[u8]) -> &[u8] {
    let first = segment.iter().position(|&c| c != b'0').unwrap_or(segment.len());
    &segment[first..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpmvercmp_basic() {
        assert_eq!(rpmvercmp("1.0", "1.0"), Ordering::Equal);
        assert_eq!(rpmvercmp("1.0", "2.0"), Ordering::Less);
        assert_eq!(rpmvercmp("2.0", "1.0"), Ordering::Greater);
        assert_eq!(rpmvercmp("2.0.1", "2.0"), Ordering::Greater);
        assert_eq!(rpmvercmp("2.0", "2.0.1"), Ordering::Less);
        assert_eq!(rpmvercmp("5.5p1", "5.5p2"), Ordering::Less);
        assert_eq!(rpmvercmp("5.5p10", "5.5p1"), Ordering::Greater);
        assert_eq!(rpmvercmp("10xyz", "10.1xyz"), Ordering::Less);
        assert_eq!(rpmvercmp("xyz10", "xyz10.1"), Ordering::Less);
    }

    #[test]
    fn test_rpmvercmp_numeric_vs_alpha() {
        assert_eq!(rpmvercmp("1.0a", "1.0.1"), Ordering::Less);
        assert_eq!(rpmvercmp("2a", "2.0"), Ordering::Less);
        assert_eq!(rpmvercmp("1.0", "1.a"), Ordering::Greater);
    }

    #[test]
    fn test_rpmvercmp_leading_zeros() {
        assert_eq!(rpmvercmp("1.01", "1.1"), Ordering::Equal);
        assert_eq!(rpmvercmp("1.010", "1.9"), Ordering::Greater);
    }

    #[test]
    fn test_rpmvercmp_separators() {
        assert_eq!(rpmvercmp("1.0_1", "1.0.1"), Ordering::Equal);
        assert_eq!(rpmvercmp("1+2", "1.2"), Ordering::Equal);
    }

    #[test]
    fn test_rpmvercmp_tilde() {
        assert_eq!(rpmvercmp("1.0~rc1", "1.0"), Ordering::Less);
        assert_eq!(rpmvercmp("1.0~rc1", "1.0~rc2"), Ordering::Less);
        assert_eq!(rpmvercmp("1.0~rc1~git123", "1.0~rc1"), Ordering::Less);
        assert_eq!(rpmvercmp("1.0", "1.0~rc1"), Ordering::Greater);
    }

    #[test]
    fn test_rpmvercmp_caret() {
        assert_eq!(rpmvercmp("1.0^", "1.0"), Ordering::Greater);
        assert_eq!(rpmvercmp("1.0^git1", "1.0"), Ordering::Greater);
        assert_eq!(rpmvercmp("1.0^git1", "1.01"), Ordering::Less);
        assert_eq!(rpmvercmp("1.0^20160101", "1.0.1"), Ordering::Less);
        assert_eq!(rpmvercmp("1.0~rc1^git1", "1.0~rc1"), Ordering::Greater);
    }
}
