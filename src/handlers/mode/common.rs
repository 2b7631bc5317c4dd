//! Mode string parsing shared by channel and user MODE.

/// One `+x`/`-x` flag from a mode string, in order of appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeFlag {
    pub adding: bool,
    pub letter: char,
}

/// Check if target is a channel (starts with # or &).
pub fn is_channel_target(target: &str) -> bool {
    matches!(target.chars().next(), Some('#' | '&'))
}

/// Split `+ik-i` style strings into flags. A string without a leading sign
/// is treated as adding.
pub fn parse_flags(modes: &str) -> Vec<ModeFlag> {
    let mut adding = true;
    let mut out = Vec::with_capacity(modes.len());
    for c in modes.chars() {
        match c {
            '+' => adding = true,
            '-' => adding = false,
            letter => out.push(ModeFlag { adding, letter }),
        }
    }
    out
}

/// Collects applied changes into a single `+ik-x key` string.
#[derive(Debug, Default)]
pub struct AppliedModes {
    letters: String,
    args: Vec<String>,
    sign: Option<bool>,
}

impl AppliedModes {
    pub fn push(&mut self, adding: bool, letter: char, arg: Option<&str>) {
        if self.sign != Some(adding) {
            self.letters.push(if adding { '+' } else { '-' });
            self.sign = Some(adding);
        }
        self.letters.push(letter);
        if let Some(arg) = arg {
            self.args.push(arg.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = self.letters.clone();
        for arg in &self.args {
            out.push(' ');
            out.push_str(arg);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_follow_the_last_sign() {
        let flags = parse_flags("+i-k+x");
        let pairs: Vec<(bool, char)> = flags.iter().map(|f| (f.adding, f.letter)).collect();
        assert_eq!(pairs, vec![(true, 'i'), (false, 'k'), (true, 'x')]);
        assert_eq!(parse_flags("i")[0], ModeFlag { adding: true, letter: 'i' });
    }

    #[test]
    fn applied_modes_group_by_sign() {
        let mut applied = AppliedModes::default();
        assert!(applied.is_empty());
        applied.push(true, 'i', None);
        applied.push(true, 'k', Some("sesame"));
        applied.push(false, 'o', None);
        assert_eq!(applied.render(), "+ik-o sesame");
    }

    #[test]
    fn channel_targets() {
        assert!(is_channel_target("#rust"));
        assert!(is_channel_target("&local"));
        assert!(!is_channel_target("alice"));
    }
}
