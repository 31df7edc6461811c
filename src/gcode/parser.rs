//! Word-level G-code parsing.

use heapless::{String, Vec};

use crate::error::{CommandError, Error, Result};
use crate::mixer::{GradientSettings, MAX_CHANNELS};

/// Most words accepted on one line.
pub const MAX_WORDS: usize = 16;

/// `M165` parameter letter for each channel.
pub const MIX_LETTERS: [char; MAX_CHANNELS] = ['A', 'B', 'C', 'D', 'H', 'I'];

/// One letter and its optional number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Word {
    /// Upper-case letter.
    pub letter: char,
    /// Number following the letter, if any.
    pub value: Option<f32>,
}

/// A parsed mixing command.
#[derive(Debug, Clone, PartialEq)]
pub enum MixCommand {
    /// `M163 S<channel> P<weight>`
    SetMixFactor {
        /// Collector channel.
        channel: u8,
        /// Raw weight; negative values are stored as zero.
        weight: f32,
    },
    /// `M164 [S<tool>]`
    SaveMix {
        /// Target tool, or the selected tool when absent.
        tool: Option<u8>,
    },
    /// `M165 [A..] [B..] [C..] [D..] [H..] [I..]`
    SetMix {
        /// Weight per channel letter, `None` when not given.
        factors: [Option<f32>; MAX_CHANNELS],
    },
    /// `M166 [A<z>] [Z<z>] [I<tool>] [J<tool>] [S<bool>] [T[<tool>]]`
    Gradient(GradientSettings),
    /// `T<n>`
    SelectTool(u8),
}

/// Split a line into words. Comments (`;` to end of line, `( ... )`) are dropped.
///
/// # Errors
///
/// Returns `CommandError::InvalidWord` for a malformed number or stray character.
pub fn parse_words(line: &str) -> Result<Vec<Word, MAX_WORDS>> {
    let code = line.split(';').next().unwrap_or("");
    let mut words = Vec::new();
    let mut chars = code.char_indices().peekable();
    let mut in_paren = false;

    while let Some((start, c)) = chars.next() {
        if in_paren {
            in_paren = c != ')';
            continue;
        }
        if c == '(' {
            in_paren = true;
            continue;
        }
        if c.is_whitespace() {
            continue;
        }
        if !c.is_ascii_alphabetic() {
            return Err(invalid_word(&code[start..]));
        }

        let number_start = start + c.len_utf8();
        let mut number_end = number_start;
        while let Some(&(i, d)) = chars.peek() {
            if d.is_ascii_digit() || d == '.' || d == '-' || d == '+' {
                number_end = i + d.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        let text = &code[number_start..number_end];
        let value = if text.is_empty() {
            None
        } else {
            Some(
                text.parse::<f32>()
                    .map_err(|_| invalid_word(&code[start..number_end]))?,
            )
        };

        words
            .push(Word {
                letter: c.to_ascii_uppercase(),
                value,
            })
            .map_err(|_| invalid_word(&code[start..]))?;
    }

    Ok(words)
}

/// Parse a line holding one mixing command.
///
/// # Errors
///
/// - `CommandError::Empty` for a blank or comment-only line
/// - `CommandError::Unsupported` for any other command
/// - `CommandError::MissingParameter` / `InvalidWord` for bad parameters
pub fn parse_command(line: &str) -> Result<MixCommand> {
    let words = parse_words(line)?;
    let (head, params) = words
        .split_first()
        .ok_or(Error::Command(CommandError::Empty))?;

    match (head.letter, head.value) {
        ('T', Some(v)) => Ok(MixCommand::SelectTool(to_index(head.letter, v)?)),
        ('M', Some(v)) if v == 163.0 => {
            let channel = require(params, 'S')?;
            let weight = find(params, 'P')
                .flatten()
                .ok_or(Error::Command(CommandError::MissingParameter('P')))?;
            Ok(MixCommand::SetMixFactor {
                channel: to_index('S', channel)?,
                weight,
            })
        }
        ('M', Some(v)) if v == 164.0 => {
            let tool = match find(params, 'S').flatten() {
                Some(s) => Some(to_index('S', s)?),
                None => None,
            };
            Ok(MixCommand::SaveMix { tool })
        }
        ('M', Some(v)) if v == 165.0 => {
            let mut factors = [None; MAX_CHANNELS];
            for (slot, letter) in factors.iter_mut().zip(MIX_LETTERS) {
                *slot = find(params, letter).flatten();
            }
            Ok(MixCommand::SetMix { factors })
        }
        ('M', Some(v)) if v == 166.0 => {
            let tool = |letter: char| -> Result<Option<u8>> {
                find(params, letter)
                    .flatten()
                    .map(|v| to_index(letter, v))
                    .transpose()
            };
            let settings = GradientSettings {
                start_z: find(params, 'A').flatten(),
                end_z: find(params, 'Z').flatten(),
                start_vtool: tool('I')?,
                end_vtool: tool('J')?,
                armed: find(params, 'S').map(|v| v.map_or(true, |s| s != 0.0)),
                alias: match find(params, 'T') {
                    Some(Some(v)) => Some(Some(to_index('T', v)?)),
                    Some(None) => Some(None),
                    None => None,
                },
            };
            Ok(MixCommand::Gradient(settings))
        }
        _ => {
            let mut name: String<16> = String::new();
            let _ = name.push(head.letter);
            if let Some(v) = head.value {
                let _ = core::fmt::write(&mut name, format_args!("{}", v));
            }
            Err(Error::Command(CommandError::Unsupported(name)))
        }
    }
}

/// Value of the first word with `letter`: `Some(None)` if it has no number.
fn find(params: &[Word], letter: char) -> Option<Option<f32>> {
    params.iter().find(|w| w.letter == letter).map(|w| w.value)
}

fn require(params: &[Word], letter: char) -> Result<f32> {
    find(params, letter)
        .flatten()
        .ok_or(Error::Command(CommandError::MissingParameter(letter)))
}

fn to_index(letter: char, value: f32) -> Result<u8> {
    if (0.0..=u8::MAX as f32).contains(&value) && value == libm::truncf(value) {
        Ok(value as u8)
    } else {
        let mut text: String<16> = String::new();
        let _ = core::fmt::write(&mut text, format_args!("{}{}", letter, value));
        Err(Error::Command(CommandError::InvalidWord(text)))
    }
}

fn invalid_word(text: &str) -> Error {
    let mut word: String<16> = String::new();
    for c in text.chars() {
        if c.is_whitespace() || word.push(c).is_err() {
            break;
        }
    }
    Error::Command(CommandError::InvalidWord(word))
}
