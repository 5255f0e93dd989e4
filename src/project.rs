//! Pairwise projection of normalized names before edit-distance measurement.
//!
//! Two names that share most of their tokens ("laptop dell xps 13" vs
//! "laptop dell xps 15") would otherwise pay edit distance for the whole
//! shared prefix. Projection strips what the pair has in common so the
//! distance reflects only the distinguishing remainder.

/// How to treat unmatched trailing tokens after common-token removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TailHandling {
    /// Zip semantics: the longer side's extra tokens are dropped from the
    /// comparison. This undercounts distance for names of unequal token
    /// count and is kept as the default for compatibility with the original
    /// pipeline; it is a known precision bug, not design intent.
    #[default]
    Truncate,
    /// Corrected mode: the longer side keeps its unmatched tail, so the
    /// distance counts it.
    Pad,
}

/// Reduce two already-normalized names to their distinguishing remainders.
///
/// If one string is a prefix of the other, both sides collapse to the shorter
/// string (distance 0). Otherwise tokens common to both sides are removed,
/// the remainders are sorted and paired positionally, and within each pair a
/// token that prefixes its partner replaces both.
pub fn project_pair(a: &str, b: &str, tail: TailHandling) -> (String, String) {
    if a.starts_with(b) {
        return (b.to_string(), b.to_string());
    }
    if b.starts_with(a) {
        return (a.to_string(), a.to_string());
    }

    let tokens_a: std::collections::BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: std::collections::BTreeSet<&str> = b.split_whitespace().collect();

    // Symmetric difference, already alphabetically ordered by the set walk.
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    let pairs = only_a.len().min(only_b.len());
    let mut out_a: Vec<&str> = Vec::with_capacity(only_a.len());
    let mut out_b: Vec<&str> = Vec::with_capacity(only_b.len());

    for i in 0..pairs {
        let (x, y) = (only_a[i], only_b[i]);
        if x.starts_with(y) {
            out_a.push(y);
            out_b.push(y);
        } else if y.starts_with(x) {
            out_a.push(x);
            out_b.push(x);
        } else {
            out_a.push(x);
            out_b.push(y);
        }
    }

    if tail == TailHandling::Pad {
        out_a.extend_from_slice(&only_a[pairs..]);
        out_b.extend_from_slice(&only_b[pairs..]);
    }

    (out_a.join(" "), out_b.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strsim::levenshtein;

    #[test]
    fn identical_inputs_project_identically() {
        let (a, b) = project_pair("laptop dell xps", "laptop dell xps", TailHandling::Truncate);
        assert_eq!(a, b);
        assert_eq!(levenshtein(&a, &b), 0);
    }

    #[test]
    fn prefix_collapses_to_shorter() {
        let (a, b) = project_pair("laptop dell", "laptop dell xps 15", TailHandling::Truncate);
        assert_eq!(a, "laptop dell");
        assert_eq!(b, "laptop dell");
    }

    #[test]
    fn shared_tokens_removed() {
        let (a, b) = project_pair("laptop dell xps 13", "laptop dell xps 15", TailHandling::Truncate);
        assert_eq!(a, "13");
        assert_eq!(b, "15");
    }

    #[test]
    fn paired_prefix_tokens_collapse() {
        // "xps" prefixes "xps15" once common tokens are gone.
        let (a, b) = project_pair("dell xps", "hp xps15", TailHandling::Truncate);
        // remainders: ["dell", "xps"] vs ["hp", "xps15"]; "dell"/"hp" stay,
        // "xps"/"xps15" collapse to "xps".
        assert_eq!(a, "dell xps");
        assert_eq!(b, "hp xps");
    }

    #[test]
    fn truncate_drops_longer_tail() {
        let (a, b) = project_pair("laptop a", "desktop b c d", TailHandling::Truncate);
        assert_eq!(a.split_whitespace().count(), b.split_whitespace().count());
    }

    #[test]
    fn pad_keeps_longer_tail() {
        let (ta, tb) = project_pair("laptop a", "desktop b c d", TailHandling::Truncate);
        let (pa, pb) = project_pair("laptop a", "desktop b c d", TailHandling::Pad);
        assert_eq!(ta, pa);
        assert!(pb.split_whitespace().count() > tb.split_whitespace().count());
        assert!(levenshtein(&pa, &pb) >= levenshtein(&ta, &tb));
    }
}
