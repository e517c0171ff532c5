//! `hdlgen list`: prints the built-in samples.

use crate::samples::SAMPLES;
use crate::GlobalArgs;

/// Runs the `hdlgen list` command.
pub fn run(_global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    print!("{}", listing());
    Ok(0)
}

fn listing() -> String {
    let width = SAMPLES.iter().map(|s| s.name.len()).max().unwrap_or(0);
    SAMPLES
        .iter()
        .map(|s| format!("{:width$}  {}\n", s.name, s.description))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_per_sample() {
        let text = listing();
        assert_eq!(text.lines().count(), SAMPLES.len());
        assert!(text.lines().any(|l| l.starts_with("dff ")));
    }

    #[test]
    fn descriptions_are_aligned() {
        let text = listing();
        let starts: Vec<usize> = text
            .lines()
            .zip(SAMPLES)
            .map(|(line, s)| line.find(s.description).unwrap())
            .collect();
        assert!(starts.windows(2).all(|w| w[0] == w[1]));
    }
}
