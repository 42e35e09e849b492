//! Late-initialization helpers.
//!
//! Every helper fills a desired field only when the user left it unset.

/// Fill `desired` from `observed` when `desired` is `None`.
///
/// Returns `true` when the field changed.
pub fn late_init<T: Clone>(desired: &mut Option<T>, observed: Option<&T>) -> bool {
    match (desired.as_ref(), observed) {
        (None, Some(value)) => {
            *desired = Some(value.clone());
            true
        }
        _ => false,
    }
}

/// Like [`late_init`], treating an empty observed string as absent.
pub fn late_init_string(desired: &mut Option<String>, observed: Option<&str>) -> bool {
    match (desired.as_ref(), observed.filter(|s| !s.is_empty())) {
        (None, Some(value)) => {
            *desired = Some(value.to_owned());
            true
        }
        _ => false,
    }
}

/// Fill an empty desired list from a non-empty observed one.
pub fn late_init_vec<T: Clone>(desired: &mut Vec<T>, observed: &[T]) -> bool {
    if desired.is_empty() && !observed.is_empty() {
        desired.extend_from_slice(observed);
        true
    } else {
        false
    }
}
