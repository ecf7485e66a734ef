use anyhow::{Context, anyhow, bail};
use tracing::{debug, info};

use weekgrid_core::config::Config;
use weekgrid_core::model::{CellKey, DAY_NAMES, Preset, Schedule, Team};
use weekgrid_core::preset::default_presets;
use weekgrid_core::selection::Modifiers;
use weekgrid_core::session::PlanningSession;
use weekgrid_http::ApiClient;

use crate::CliCommand;
use crate::render::Renderer;

#[tracing::instrument(skip(cfg, command))]
pub fn dispatch(cfg: &Config, command: CliCommand) -> anyhow::Result<()> {
    let client = ApiClient::from_config(cfg)?;
    let mut renderer = Renderer::new(cfg)?;

    match command {
        CliCommand::Presets => {
            let presets = fetch_presets(&client)?;
            renderer.print_presets(&presets)?;
            Ok(())
        }
        CliCommand::Show => {
            let (teams, session) = load_session(cfg, &client)?;
            for (label, week) in [
                ("Current Week", session.current_schedule()),
                ("Next Week", session.next_schedule()),
            ] {
                let Some(week) = week else {
                    println!("{label}: no schedule");
                    continue;
                };
                renderer.print_week(label, week, &teams, session.store())?;
            }
            Ok(())
        }
        CliCommand::Assign {
            week,
            resource,
            to_resource,
            days,
            preset,
            code,
        } => {
            let (teams, mut session) = load_session(cfg, &client)?;
            let schedule_id = resolve_week(session.schedules(), &week)?.id.clone();
            select_rectangle(
                &mut session,
                &teams,
                &schedule_id,
                &resource,
                to_resource.as_deref(),
                &days,
            )?;

            let updated = match (preset, code) {
                (Some(label), None) => {
                    let preset = find_preset(&fetch_presets(&client)?, &label)?;
                    session.set_active_preset(Some(preset));
                    session.apply_active_preset(&client)?
                }
                (None, Some(code)) => session.bulk_set(&code, &client)?,
                _ => bail!("provide a task code or --preset LABEL"),
            };

            info!(updated, "assign committed");
            println!("updated {updated} cell(s)");
            Ok(())
        }
        CliCommand::Clear {
            week,
            resource,
            to_resource,
            days,
            yes,
        } => {
            let (teams, mut session) = load_session(cfg, &client)?;
            let schedule_id = resolve_week(session.schedules(), &week)?.id.clone();
            select_rectangle(
                &mut session,
                &teams,
                &schedule_id,
                &resource,
                to_resource.as_deref(),
                &days,
            )?;

            let staged = session.request_clear();
            if staged == 0 {
                println!("nothing selected, nothing to clear");
                return Ok(());
            }
            if !yes {
                session.cancel_clear();
                println!("would clear {staged} cell(s); re-run with --yes to confirm");
                return Ok(());
            }

            let cleared = session.confirm_clear(&client)?;
            println!("cleared {cleared} cell(s)");
            Ok(())
        }
        CliCommand::Copy {
            week,
            from,
            day,
            to,
            to_days,
        } => {
            let (teams, mut session) = load_session(cfg, &client)?;
            let schedule_id = resolve_week(session.schedules(), &week)?.id.clone();

            let source_id = resolve_resource(&teams, &from)?;
            let source = CellKey::new(schedule_id.clone(), source_id, parse_day(&day)?);
            session.copy_cell(&source);
            if session.clipboard().is_empty() {
                println!("source cell is empty; nothing copied");
                return Ok(());
            }

            select_rectangle(&mut session, &teams, &schedule_id, &to, None, &to_days)?;
            let pasted = session.paste_to_selection(&client)?;
            println!("pasted into {pasted} cell(s)");
            Ok(())
        }
    }
}

fn load_session(cfg: &Config, client: &ApiClient) -> anyhow::Result<(Vec<Team>, PlanningSession)> {
    let teams = client.get_teams()?;
    let schedules = client.get_schedules()?;
    let session = PlanningSession::new(&teams, schedules, cfg.color_table());
    Ok((teams, session))
}

fn fetch_presets(client: &ApiClient) -> anyhow::Result<Vec<Preset>> {
    let presets = client.get_presets()?;
    if presets.is_empty() {
        debug!("backend has no presets; using built-in defaults");
        return Ok(default_presets());
    }
    Ok(presets)
}

fn find_preset(presets: &[Preset], label: &str) -> anyhow::Result<Preset> {
    presets
        .iter()
        .find(|p| p.label.eq_ignore_ascii_case(label))
        .cloned()
        .with_context(|| format!("no preset labelled {label:?}"))
}

/// Build the selection the way a pointer would: click one corner, then
/// shift-click the opposite one.
fn select_rectangle(
    session: &mut PlanningSession,
    teams: &[Team],
    schedule_id: &str,
    resource: &str,
    to_resource: Option<&str>,
    days: &str,
) -> anyhow::Result<()> {
    let first_id = resolve_resource(teams, resource)?;
    let second_id = match to_resource {
        Some(name) => resolve_resource(teams, name)?,
        None => first_id.clone(),
    };
    let (day_lo, day_hi) = parse_day_range(days)?;

    session.pointer_down(
        CellKey::new(schedule_id, first_id, day_lo),
        Modifiers::NONE,
    );
    session.pointer_up();
    session.pointer_down(
        CellKey::new(schedule_id, second_id, day_hi),
        Modifiers::SHIFT,
    );
    session.pointer_up();

    if session.selection().is_empty() {
        bail!("selection is empty; is the resource active?");
    }
    Ok(())
}

fn resolve_week<'a>(schedules: &'a [Schedule], week: &str) -> anyhow::Result<&'a Schedule> {
    let found = match week.to_ascii_lowercase().as_str() {
        "current" => schedules.iter().find(|s| s.is_current),
        "next" => schedules.iter().find(|s| s.is_next),
        other => bail!("unknown week {other:?} (expected \"current\" or \"next\")"),
    };
    found.ok_or_else(|| anyhow!("no {week} week schedule on the backend"))
}

fn resolve_resource(teams: &[Team], needle: &str) -> anyhow::Result<String> {
    for team in teams {
        for resource in &team.resources {
            if resource.id == needle || resource.name.eq_ignore_ascii_case(needle) {
                return Ok(resource.id.clone());
            }
        }
    }
    Err(anyhow!("no mailer named {needle:?}"))
}

fn parse_day(raw: &str) -> anyhow::Result<u8> {
    let trimmed = raw.trim();
    if let Ok(num) = trimmed.parse::<u8>() {
        if num > 6 {
            bail!("day {num} out of range 0-6");
        }
        return Ok(num);
    }

    let lower = trimmed.to_ascii_lowercase();
    if lower.len() >= 3 {
        for (idx, name) in DAY_NAMES.iter().enumerate() {
            if name.to_ascii_lowercase().starts_with(&lower) {
                return Ok(idx as u8);
            }
        }
    }
    Err(anyhow!("cannot parse day {raw:?} (try \"mon\" or 0-6)"))
}

fn parse_day_range(raw: &str) -> anyhow::Result<(u8, u8)> {
    match raw.split_once('-') {
        Some((lo, hi)) => {
            let lo = parse_day(lo)?;
            let hi = parse_day(hi)?;
            Ok((lo.min(hi), lo.max(hi)))
        }
        None => {
            let day = parse_day(raw)?;
            Ok((day, day))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_names_and_numbers_parse() {
        assert_eq!(parse_day("mon").expect("mon"), 0);
        assert_eq!(parse_day("Sunday").expect("sunday"), 6);
        assert_eq!(parse_day("3").expect("3"), 3);
        assert!(parse_day("7").is_err());
        assert!(parse_day("mo").is_err());
    }

    #[test]
    fn day_ranges_normalize_direction() {
        assert_eq!(parse_day_range("mon-wed").expect("range"), (0, 2));
        assert_eq!(parse_day_range("fri-tue").expect("range"), (1, 4));
        assert_eq!(parse_day_range("sat").expect("single"), (5, 5));
    }
}
