//! Replay script parsing.
//!
//! One event per line; blank lines and `#` comments are skipped.
//!
//! ```text
//! press primary 0 0        # button press at (x, y), optional modifiers
//! move 20 0                # pointer motion
//! release primary 20 0
//! wait 400                 # advance the replay clock (milliseconds)
//! key shift+left           # named key or single character
//! type hello world         # one rune per character
//! resize 800 600
//! ```
//!
//! Pointer events are stamped from a virtual clock that only `wait` moves,
//! so two presses without a `wait` between them form a double click.

use anyhow::{Context, Result, anyhow, bail};
use core_events::{Button, Direction, InputEvent, KeyCode, KeyEvent, Modifiers, PointerEvent};
use core_geom::Point;
use std::time::{Duration, Instant};

fn button(word: &str) -> Result<Button> {
    match word {
        "primary" | "1" => Ok(Button::Primary),
        "middle" | "2" => Ok(Button::Middle),
        "secondary" | "3" => Ok(Button::Secondary),
        other => bail!("unknown button `{other}`"),
    }
}

fn modifier(word: &str) -> Result<Modifiers> {
    match word {
        "shift" => Ok(Modifiers::SHIFT),
        "ctrl" => Ok(Modifiers::CTRL),
        "alt" => Ok(Modifiers::ALT),
        "meta" => Ok(Modifiers::META),
        other => bail!("unknown modifier `{other}`"),
    }
}

fn number<T: std::str::FromStr>(word: Option<&str>, what: &str) -> Result<T> {
    let word = word.ok_or_else(|| anyhow!("missing {what}"))?;
    word.parse()
        .map_err(|_| anyhow!("{what} `{word}` is not a number"))
}

fn point<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<Point> {
    let x = number(words.next(), "x")?;
    let y = number(words.next(), "y")?;
    Ok(Point::new(x, y))
}

fn key(spec: &str) -> Result<KeyEvent> {
    let mut parts: Vec<&str> = spec.split('+').collect();
    // `key +` and `key shift++` name the plus character itself
    if spec.ends_with("++") || spec == "+" {
        parts.truncate(parts.len().saturating_sub(2));
        parts.push("+");
    }
    let name = parts.pop().unwrap_or_default();
    let mut mods = Modifiers::empty();
    for m in parts {
        mods |= modifier(m)?;
    }
    let code = match name {
        "enter" => KeyCode::Enter,
        "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "escape" | "esc" => KeyCode::Escape,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "space" => return Ok(KeyEvent::rune(' ').with_modifiers(mods)),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => return Ok(KeyEvent::rune(c).with_modifiers(mods)),
                _ => bail!("unknown key `{other}`"),
            }
        }
    };
    Ok(KeyEvent::new(code).with_modifiers(mods))
}

fn parse_line(line: &str, now: &mut Instant, out: &mut Vec<InputEvent>) -> Result<()> {
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let mut words = rest.split_whitespace();
    match verb {
        "press" | "release" => {
            let b = button(words.next().ok_or_else(|| anyhow!("missing button"))?)?;
            let pt = point(&mut words)?;
            let mut mods = Modifiers::empty();
            for m in words {
                mods |= modifier(m)?;
            }
            let dir = if verb == "press" {
                Direction::Press
            } else {
                Direction::Release
            };
            let ev = PointerEvent::new(b, dir, pt).with_modifiers(mods).at(*now);
            out.push(InputEvent::Pointer(ev));
        }
        "move" => {
            let pt = point(&mut words)?;
            out.push(InputEvent::Pointer(PointerEvent::motion(pt).at(*now)));
        }
        "wait" => {
            let ms: u64 = number(words.next(), "milliseconds")?;
            *now += Duration::from_millis(ms);
        }
        "key" => {
            let spec = words.next().ok_or_else(|| anyhow!("missing key"))?;
            out.push(InputEvent::Key(key(spec)?));
        }
        "type" => {
            out.extend(rest.chars().map(|c| InputEvent::Key(KeyEvent::rune(c))));
        }
        "resize" => {
            let size = point(&mut words)?;
            out.push(InputEvent::Resize(size));
        }
        other => bail!("unknown command `{other}`"),
    }
    Ok(())
}

/// Parse a whole script, stamping pointer events from `start`.
pub fn parse(text: &str, start: Instant) -> Result<Vec<InputEvent>> {
    let mut now = start;
    let mut out = Vec::new();
    for (n, raw) in text.lines().enumerate() {
        let line = match raw.split_once(" #") {
            Some((code, _)) => code,
            None => raw,
        };
        let line = line.trim_start();
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        parse_line(line.trim_end_matches(['\r', '\n']), &mut now, &mut out)
            .with_context(|| format!("script line {}: `{}`", n + 1, raw.trim()))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pointer_lines_use_virtual_clock() {
        let t0 = Instant::now();
        let evs = parse(
            "# drag\npress primary 0 0\nmove 8 0 # halfway\nwait 400\nrelease 1 20 10 shift\n",
            t0,
        )
        .unwrap();
        assert_eq!(evs.len(), 3);
        let InputEvent::Pointer(p) = evs[0] else {
            panic!("expected pointer, got {:?}", evs[0]);
        };
        assert!(p.is_press(Button::Primary));
        assert_eq!(p.timestamp, t0);
        let InputEvent::Pointer(r) = evs[2] else {
            panic!("expected pointer, got {:?}", evs[2]);
        };
        assert!(r.is_release(Button::Primary));
        assert_eq!(r.point, Point::new(20, 10));
        assert_eq!(r.modifiers, Modifiers::SHIFT);
        assert_eq!(r.timestamp, t0 + Duration::from_millis(400));
    }

    #[test]
    fn keys_and_typing() {
        let evs = parse("key shift+left\nkey enter\nkey x\nkey ctrl++\ntype a b\nresize 80 40\n", Instant::now()).unwrap();
        assert_eq!(
            evs,
            vec![
                InputEvent::Key(KeyEvent::new(KeyCode::Left).with_modifiers(Modifiers::SHIFT)),
                InputEvent::Key(KeyEvent::new(KeyCode::Enter)),
                InputEvent::Key(KeyEvent::rune('x')),
                InputEvent::Key(KeyEvent::rune('+').with_modifiers(Modifiers::CTRL)),
                InputEvent::Key(KeyEvent::rune('a')),
                InputEvent::Key(KeyEvent::rune(' ')),
                InputEvent::Key(KeyEvent::rune('b')),
                InputEvent::Resize(Point::new(80, 40)),
            ]
        );
    }

    #[test]
    fn errors_name_the_line() {
        let err = parse("move 1 1\npress thumb 0 0\n", Instant::now()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("script line 2"), "{msg}");
        assert!(msg.contains("unknown button `thumb`"), "{msg}");
        assert!(parse("jump 3", Instant::now()).is_err());
        assert!(parse("move 1", Instant::now()).is_err());
    }
}
