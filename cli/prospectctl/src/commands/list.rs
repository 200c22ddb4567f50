//! List command (registered families per area code).

use anyhow::Result;
use clap::Args;
use prospect_id::{AreaCode, Registry};
use serde::Serialize;
use tabled::Tabled;

use crate::error::CliError;
use crate::output::print_output;

use super::CommandContext;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only list this 5-digit area code.
    area_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct FamilyRow {
    #[tabled(rename = "Area")]
    area_code: String,

    #[tabled(rename = "Family")]
    family: String,

    #[tabled(rename = "Letters")]
    letters: String,

    #[tabled(rename = "Next")]
    next: String,
}

fn family_rows(registry: &Registry, only: Option<AreaCode>) -> Vec<FamilyRow> {
    let mut rows = Vec::new();
    for area_code in registry.area_codes().filter(|a| only.is_none_or(|o| o == *a)) {
        for family in registry.families(&area_code) {
            let letters: String = registry
                .letters(&area_code, &family)
                .unwrap_or_default()
                .iter()
                .map(|l| l.as_char())
                .collect();
            let next = registry
                .next_available_letter(&format!("{area_code}{family}"))
                .map(|l| l.to_string())
                .unwrap_or_else(|_| "-".to_string());
            rows.push(FamilyRow {
                area_code: area_code.to_string(),
                family: family.to_string(),
                letters,
                next,
            });
        }
    }
    rows
}

pub async fn run(ctx: CommandContext, args: ListArgs) -> Result<()> {
    let only = args
        .area_code
        .as_deref()
        .map(AreaCode::parse)
        .transpose()
        .map_err(CliError::from)?;

    let loaded = ctx.load().await?;
    print_output(&family_rows(&loaded.registry, only), ctx.format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospect_id::ProspectId;

    #[test]
    fn test_family_rows() {
        let reg: Registry = ["01001001A", "01001001B", "01001002Z", "12345001A"]
            .iter()
            .map(|s| s.parse::<ProspectId>().unwrap())
            .collect();

        let rows = family_rows(&reg, None);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].letters, "AB");
        assert_eq!(rows[0].next, "C");
        assert_eq!(rows[1].next, "-");

        let only = AreaCode::parse("12345").ok();
        let rows = family_rows(&reg, only);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].family, "001");
    }
}
