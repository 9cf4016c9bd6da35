//! Name inflection.
//!
//! Transition, state and method names are stored in their underscored form
//! (`shift_up`). Callers may pass camel case (`ShiftUp`, `shiftUp`) and get
//! the same key. Humanized forms (`Shift Up`) exist only for display.

/// Convert a name to its underscored key form.
///
/// ```rust
/// use machinist::core::inflect::underscore;
///
/// assert_eq!(underscore("ShiftUp"), "shift_up");
/// assert_eq!(underscore("shiftUp"), "shift_up");
/// assert_eq!(underscore("shift_up"), "shift_up");
/// assert_eq!(underscore("turn-off"), "turn_off");
/// ```
pub fn underscore(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;

    for ch in name.trim().chars() {
        let ch = if ch == '-' || ch == ' ' { '_' } else { ch };

        if ch.is_uppercase() {
            if matches!(prev, Some(p) if p.is_alphanumeric()) {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
        prev = Some(ch);
    }

    out
}

/// Render a key for humans: underscores become spaces and every word
/// starts with an upper-case letter.
///
/// ```rust
/// use machinist::core::inflect::humanize;
///
/// assert_eq!(humanize("first_gear"), "First Gear");
/// assert_eq!(humanize("driver, thief"), "Driver, Thief");
/// assert_eq!(humanize("RulesVehicle"), "RulesVehicle");
/// ```
pub fn humanize(name: &str) -> String {
    name.replace('_', " ")
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
