//! Disallowed-character policies shared by content queries and bridge input
//! validation.

/// Which characters a value may not contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharacterPolicy {
    /// `< > " '`
    Basic,
    /// Basic plus `{ } ( ) [ ] ; $ . #` and `<script>` / `</script>` tags
    #[default]
    Strict,
}

const BASIC_CHARS: &[char] = &['<', '>', '"', '\''];
const STRICT_EXTRA_CHARS: &[char] = &['{', '}', '(', ')', '[', ']', ';', '$', '.', '#'];
const SCRIPT_TAGS: &[&str] = &["<script>", "</script>"];

impl CharacterPolicy {
    /// Returns the first offending character or tag found in `input`.
    pub fn find_disallowed(&self, input: &str) -> Option<String> {
        if *self == CharacterPolicy::Strict {
            let lowered = input.to_ascii_lowercase();
            if let Some(tag) = SCRIPT_TAGS.iter().find(|tag| lowered.contains(*tag)) {
                return Some((*tag).to_string());
            }
        }

        input
            .chars()
            .find(|c| {
                BASIC_CHARS.contains(c)
                    || (*self == CharacterPolicy::Strict && STRICT_EXTRA_CHARS.contains(c))
            })
            .map(String::from)
    }

    pub fn allows(&self, input: &str) -> bool {
        self.find_disallowed(input).is_none()
    }
}
