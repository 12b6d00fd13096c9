// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Orbifold-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Orbifold and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;

use ratatui::style::{Color, Modifier, Style};

use crate::model::BlockKind;

pub(crate) const PALETTE_ENV: &str = "ORBIFOLD_PALETTE";

/// Terminal colours. Without an override the terminal's own 16 ANSI colours are used.
#[derive(Debug, Clone, Default)]
pub(crate) struct TuiTheme {
    palette: Option<TuiPalette>,
}

impl TuiTheme {
    pub(crate) fn from_env() -> Result<Self, ThemeError> {
        let value = match env::var(PALETTE_ENV) {
            Ok(value) => value,
            Err(env::VarError::NotPresent) => return Ok(Self::default()),
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ThemeError::InvalidEnv {
                    name: PALETTE_ENV,
                    value: "<non-unicode>".to_owned(),
                });
            }
        };
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let palette = TuiPalette::parse_csv(trimmed).map_err(|reason| ThemeError::InvalidEnv {
            name: PALETTE_ENV,
            value: format!("{trimmed} ({reason})"),
        })?;
        Ok(Self { palette: Some(palette) })
    }

    pub(crate) fn base_style(&self) -> Style {
        match &self.palette {
            Some(palette) => Style::default().fg(palette.fg).bg(palette.bg),
            None => Style::default(),
        }
    }

    fn color(&self, ansi: Ansi) -> Color {
        match &self.palette {
            Some(palette) => palette.ansi[ansi as usize],
            None => ansi.into(),
        }
    }

    pub(crate) fn panel_border_style(&self, focused: bool) -> Style {
        if focused {
            self.base_style().fg(self.color(Ansi::Yellow))
        } else {
            self.base_style()
        }
    }

    pub(crate) fn block_style(&self, kind: BlockKind) -> Style {
        let ansi = match kind {
            BlockKind::ZkPrimitive => Ansi::Magenta,
            BlockKind::CryptoPrimitive => Ansi::Blue,
            BlockKind::CurvePrimitive => Ansi::Cyan,
            BlockKind::Verification => Ansi::Green,
            BlockKind::Mechanism => Ansi::Yellow,
            BlockKind::Input => Ansi::White,
            BlockKind::Output => Ansi::BrightWhite,
        };
        self.base_style().fg(self.color(ansi))
    }

    pub(crate) fn connection_style(&self) -> Style {
        self.base_style().fg(self.color(Ansi::BrightBlack))
    }

    pub(crate) fn preview_style(&self) -> Style {
        self.base_style().fg(self.color(Ansi::BrightYellow)).add_modifier(Modifier::DIM)
    }

    pub(crate) fn anchor_style(&self, active: bool) -> Style {
        if active {
            self.base_style().fg(self.color(Ansi::BrightYellow)).add_modifier(Modifier::BOLD)
        } else {
            self.base_style().fg(self.color(Ansi::BrightBlack))
        }
    }

    pub(crate) fn selection_style(&self) -> Style {
        self.base_style().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    }

    pub(crate) fn label_style(&self) -> Style {
        self.base_style().fg(self.color(Ansi::White))
    }

    pub(crate) fn key_style(&self) -> Style {
        self.base_style().fg(self.color(Ansi::Cyan))
    }

    pub(crate) fn error_style(&self) -> Style {
        self.base_style().fg(self.color(Ansi::Red))
    }
}

/// `fg,bg` followed by the 16 ANSI colours, each `#RRGGBB` or `rgb:RR/GG/BB`.
#[derive(Debug, Clone, PartialEq)]
struct TuiPalette {
    fg: Color,
    bg: Color,
    ansi: [Color; 16],
}

impl TuiPalette {
    const CSV_LEN: usize = 18;

    fn parse_csv(value: &str) -> Result<Self, String> {
        let colors = value.split(',').map(parse_color).collect::<Result<Vec<_>, _>>()?;
        let [fg, bg, ansi @ ..] = colors.as_slice() else {
            return Err(format!("expected {} colors, got {}", Self::CSV_LEN, colors.len()));
        };
        let ansi: [Color; 16] = ansi
            .try_into()
            .map_err(|_| format!("expected {} colors, got {}", Self::CSV_LEN, colors.len()))?;
        Ok(Self { fg: *fg, bg: *bg, ansi })
    }
}

fn parse_color(raw: &str) -> Result<Color, String> {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("rgb:") {
        let channels = rest.split('/').map(parse_channel).collect::<Result<Vec<_>, _>>()?;
        let [r, g, b] = channels.as_slice() else {
            return Err(format!("invalid rgb: value {trimmed}"));
        };
        return Ok(Color::Rgb(*r, *g, *b));
    }

    let hex = lower.strip_prefix('#').or_else(|| lower.strip_prefix("0x")).unwrap_or(&lower);
    if hex.len() != 6 {
        return Err(format!("invalid hex color {trimmed} (expected #RRGGBB)"));
    }
    let rgb = u32::from_str_radix(hex, 16).map_err(|_| format!("invalid hex color {trimmed}"))?;
    Ok(Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
}

fn parse_channel(raw: &str) -> Result<u8, String> {
    let parsed = u16::from_str_radix(raw, 16).map_err(|_| format!("invalid channel {raw}"))?;
    match raw.len() {
        2 => Ok(parsed as u8),
        4 => Ok((parsed >> 8) as u8),
        _ => Err(format!("invalid channel {raw} (expected 2 or 4 hex digits)")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
enum Ansi {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl From<Ansi> for Color {
    fn from(value: Ansi) -> Self {
        match value {
            Ansi::Black => Color::Black,
            Ansi::Red => Color::Red,
            Ansi::Green => Color::Green,
            Ansi::Yellow => Color::Yellow,
            Ansi::Blue => Color::Blue,
            Ansi::Magenta => Color::Magenta,
            Ansi::Cyan => Color::Cyan,
            Ansi::White => Color::Gray,
            Ansi::BrightBlack => Color::DarkGray,
            Ansi::BrightRed => Color::LightRed,
            Ansi::BrightGreen => Color::LightGreen,
            Ansi::BrightYellow => Color::LightYellow,
            Ansi::BrightBlue => Color::LightBlue,
            Ansi::BrightMagenta => Color::LightMagenta,
            Ansi::BrightCyan => Color::LightCyan,
            Ansi::BrightWhite => Color::White,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub(crate) enum ThemeError {
    #[error("invalid env {name}={value}")]
    InvalidEnv { name: &'static str, value: String },
}
