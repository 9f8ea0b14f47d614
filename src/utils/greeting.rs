#![forbid(unsafe_code)]

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Greeting returned when no usable name is provided.
const DEFAULT_GREETING : &str = "Hello, World!";

// ***************************************************************************
//                              Public Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// make_greeting:
// ---------------------------------------------------------------------------
/** Produce the greeting for an optional caller-supplied name.  An absent or
 * empty name yields the default greeting; anything else gets embedded in the
 * greeting template.  This function always succeeds and has no side effects.
 */
pub fn make_greeting(name: Option<&str>) -> String {
    match name {
        Some(n) if !n.is_empty() => format!("Hello, {}!", n),
        _ => DEFAULT_GREETING.to_string(),
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_name_gets_default() {
        assert_eq!(make_greeting(None), "Hello, World!");
    }

    #[test]
    fn empty_name_gets_default() {
        // Empty string is treated the same as no name at all.
        assert_eq!(make_greeting(Some("")), "Hello, World!");
    }

    #[test]
    fn name_is_embedded() {
        assert_eq!(make_greeting(Some("Ada")), "Hello, Ada!");
        assert_eq!(make_greeting(Some("Grace Hopper")), "Hello, Grace Hopper!");
    }

    #[test]
    fn repeated_calls_are_stable() {
        let first = make_greeting(Some("Bud"));
        for _ in 0..10 {
            assert_eq!(make_greeting(Some("Bud")), first);
        }
    }
}
