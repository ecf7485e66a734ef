use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use unicode_width::UnicodeWidthStr;

use weekgrid_core::model::{DAY_NAMES, CellKey, Preset, Schedule, Team};
use weekgrid_core::store::AssignmentStore;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &weekgrid_core::config::Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, schedule, teams, store))]
    pub fn print_week(
        &mut self,
        label: &str,
        schedule: &Schedule,
        teams: &[Team],
        store: &AssignmentStore,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(
            out,
            "{label} ({} .. {}), week {}/{}",
            schedule.week_start, schedule.week_end, schedule.week_number, schedule.year
        )?;

        let mut headers = vec!["Team".to_string(), "Mailer".to_string()];
        headers.extend(DAY_NAMES.iter().map(|d| d[..3].to_string()));

        let mut teams_sorted: Vec<&Team> = teams.iter().collect();
        teams_sorted.sort_by_key(|t| t.order);

        let mut rows = Vec::new();
        for team in teams_sorted {
            let mut resources: Vec<_> = team.resources.iter().filter(|r| r.is_active).collect();
            resources.sort_by_key(|r| r.order);

            for (idx, resource) in resources.iter().enumerate() {
                let team_cell = if idx == 0 {
                    team.display_name.clone()
                } else {
                    String::new()
                };

                let mut row = vec![team_cell, resource.name.clone()];
                for day in 0..DAY_NAMES.len() as u8 {
                    let cell = CellKey::new(schedule.id.clone(), resource.id.clone(), day);
                    let text = match store.get(&cell) {
                        Some(assignment) => {
                            self.paint_hex(&assignment.task_code, assignment.task_color.as_deref())
                        }
                        None => String::new(),
                    };
                    row.push(text);
                }
                rows.push(row);
            }
        }

        write_table(&mut out, headers, rows)?;
        writeln!(out)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, presets))]
    pub fn print_presets(&mut self, presets: &[Preset]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec![
            "Label".to_string(),
            "Codes".to_string(),
            "Color".to_string(),
        ];
        let rows = presets
            .iter()
            .map(|preset| {
                vec![
                    self.paint_hex(&preset.label, Some(&preset.color)),
                    preset.codes.join(", "),
                    preset.color.clone(),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    fn paint_hex(&self, text: &str, hex: Option<&str>) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        let Some((r, g, b)) = hex.and_then(parse_hex_color) else {
            return text.to_string();
        };
        format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m")
    }
}

fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
