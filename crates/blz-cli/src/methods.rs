//! # Methods CLI — List registered checksum methods.

use anyhow::Result;
use blz_checksum::MethodRegistry;
use clap::Args;
use serde::Serialize;

/// Arguments of `blz methods`.
#[derive(Args, Debug)]
pub struct MethodsArgs {
    /// Include lettered sub-variants used by fallback stages.
    #[arg(long)]
    pub variants: bool,

    /// Print as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Row<'a> {
    id: &'a str,
    #[serde(flatten)]
    params: &'a blz_checksum::MethodParameters,
}

/// Execute `blz methods`.
pub fn run_methods(args: &MethodsArgs) -> Result<u8> {
    println!("{}", render(&MethodRegistry::standard(), args.variants, args.json)?);
    Ok(0)
}

/// Table or JSON listing of the registry.
pub fn render(registry: &MethodRegistry, variants: bool, json: bool) -> Result<String> {
    let ids = if variants { registry.ids() } else { registry.base_ids() };
    let rows: Vec<Row<'_>> = ids
        .into_iter()
        .filter_map(|id| registry.get(id.as_str()).map(|params| Row { id: id.as_str(), params }))
        .collect();
    if json {
        return Ok(serde_json::to_string_pretty(&rows)?);
    }

    let mut out = String::new();
    for row in &rows {
        let p = row.params;
        if p.has_checksum() {
            out.push_str(&format!(
                "{:<4} mod {:<3} weights {:?} positions {}-{} check {}\n",
                row.id,
                p.modulus,
                p.weights,
                p.start + 1,
                p.stop + 1,
                p.check + 1
            ));
        } else {
            out.push_str(&format!("{:<4} no check digit\n", row.id));
        }
    }
    out.push_str(&format!("Total: {} methods", rows.len()));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_base_methods_by_default() {
        let registry = MethodRegistry::standard();
        let text = render(&registry, false, false).unwrap();
        assert!(text.ends_with(&format!("Total: {} methods", registry.base_ids().len())));
        assert!(text.contains("09   no check digit"));
        assert!(!text.contains("51a"));
        assert!(render(&registry, true, false).unwrap().contains("51a"));
    }

    #[test]
    fn json_rows_carry_parameters() {
        let registry = MethodRegistry::standard();
        let rows: serde_json::Value = serde_json::from_str(&render(&registry, false, true).unwrap()).unwrap();
        let first = &rows[0];
        assert_eq!(first["id"], "00");
        assert_eq!(first["modulus"], 10);
        assert!(first["weights"].is_array());
    }
}
