use cryoform::core::chemistry::metrics::Metrics;
use cryoform::core::evaluation::validator::ValidationReport;
use cryoform::core::models::ingredient::IngredientRecord;
use cryoform::core::models::recipe::RecipeLine;
use cryoform::workflows::analyze::AnalysisReport;
use cryoform::workflows::formulate::FormulationReport;
use cryoform::workflows::preserve::PreservationReport;
use std::fmt::{self, Write};

pub fn analysis(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = write_analysis(&mut out, report);
    out
}

pub fn formulation(report: &FormulationReport) -> String {
    let mut out = String::new();
    let _ = write_formulation(&mut out, report);
    out
}

pub fn preservation(report: &PreservationReport) -> String {
    let mut out = String::new();
    let _ = write_preservation(&mut out, report);
    out
}

pub fn catalog_listing<'a>(records: impl Iterator<Item = &'a IngredientRecord>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<24} {:<12} {}", "ID", "CATEGORY", "NAME");
    for record in records {
        let _ = writeln!(
            out,
            "{:<24} {:<12} {}",
            record.id,
            record.category.as_str(),
            record.name
        );
    }
    out
}

pub fn ingredient(record: &IngredientRecord) -> String {
    let mut out = String::new();
    let _ = write_ingredient(&mut out, record);
    out
}

fn write_lines(out: &mut String, lines: &[RecipeLine]) -> fmt::Result {
    writeln!(out, "{:<32} {:>10}", "Ingredient", "Mass (g)")?;
    for line in lines {
        writeln!(out, "{:<32} {:>10.1}", line.ingredient.name, line.mass_g)?;
    }
    Ok(())
}

fn write_metrics(out: &mut String, metrics: &Metrics) -> fmt::Result {
    writeln!(out, "  Total mass        {:>8.1} g", metrics.total_g)?;
    if metrics.evaporated_water_g > 0.0 {
        writeln!(
            out,
            "  Evaporated water  {:>8.1} g",
            metrics.evaporated_water_g
        )?;
    }
    writeln!(out, "  Water             {:>8.2} %", metrics.water_pct)?;
    writeln!(out, "  Total solids      {:>8.2} %", metrics.ts_additive_pct)?;
    writeln!(
        out,
        "  TS (mass balance) {:>8.2} %",
        metrics.ts_mass_balance_pct
    )?;
    writeln!(out, "  Sugars            {:>8.2} %", metrics.sugars_pct)?;
    writeln!(out, "  Fat               {:>8.2} %", metrics.fat_pct)?;
    writeln!(out, "  MSNF              {:>8.2} %", metrics.msnf_pct)?;
    writeln!(out, "  Other solids      {:>8.2} %", metrics.other_solids_pct)?;
    writeln!(out, "  SP                {:>8.2}", metrics.sp)?;
    writeln!(out, "  PAC               {:>8.2}", metrics.pac)?;
    writeln!(out, "  Stabilizer        {:>8.2} %", metrics.stabilizer_pct)?;
    writeln!(out, "  Fruit             {:>8.2} %", metrics.fruit_pct)?;
    if let Some(cost_per_kg) = metrics.cost_per_kg {
        writeln!(out, "  Cost              {:>8.2} /kg", cost_per_kg)?;
    }
    Ok(())
}

fn write_validation(out: &mut String, validation: &ValidationReport) -> fmt::Result {
    for (field, passed) in &validation.passed {
        writeln!(
            out,
            "  {} {}",
            if *passed { "✓" } else { "✗" },
            field
        )?;
    }
    for message in &validation.messages {
        writeln!(out, "  - {}", message)?;
    }
    Ok(())
}

fn write_warnings(out: &mut String, warnings: &[String]) -> fmt::Result {
    if warnings.is_empty() {
        return Ok(());
    }
    writeln!(out, "\nWarnings:")?;
    for warning in warnings {
        writeln!(out, "  ! {}", warning)?;
    }
    Ok(())
}

fn write_analysis(out: &mut String, report: &AnalysisReport) -> fmt::Result {
    write_lines(out, &report.lines)?;
    writeln!(out, "\nMetrics:")?;
    write_metrics(out, &report.metrics)?;

    writeln!(out, "\nClassification: {}", report.classified_as)?;
    for entry in &report.ranking {
        writeln!(
            out,
            "  {:<16} {:>8.3}",
            entry.archetype.as_str(),
            entry.distance
        )?;
    }

    writeln!(out, "\nValidation against {}:", report.validated_against)?;
    write_validation(out, &report.validation)?;
    write_warnings(out, &report.warnings)
}

fn write_formulation(out: &mut String, report: &FormulationReport) -> fmt::Result {
    let result = &report.result;
    write_lines(out, &result.lines)?;

    writeln!(out, "\nTargets:")?;
    writeln!(
        out,
        "  {:<14} {:>8} {:>8} {:>8}",
        "Field", "Target", "Seed", "Result"
    )?;
    for (field, target) in report.targets.iter() {
        writeln!(
            out,
            "  {:<14} {:>8.2} {:>8.2} {:>8.2}",
            field.as_str(),
            target,
            field.value(&report.seed_metrics),
            field.value(&result.metrics)
        )?;
    }
    writeln!(
        out,
        "\n{} after {} evaluation(s), objective {:.6}",
        if result.converged {
            "Converged"
        } else {
            "Stopped at the evaluation cap"
        },
        result.evaluations,
        result.objective
    )?;

    writeln!(out, "\nMetrics:")?;
    write_metrics(out, &result.metrics)?;
    writeln!(out, "\nValidation against {}:", report.archetype)?;
    write_validation(out, &report.validation)?;
    write_warnings(out, &report.warnings)
}

fn write_preservation(out: &mut String, report: &PreservationReport) -> fmt::Result {
    let lab = &report.paste.lab;
    writeln!(out, "Paste: {}", report.paste.name)?;
    write!(out, "  Brix {:.1}, pH {:.2}", lab.brix, lab.ph)?;
    if let Some(aw) = lab.water_activity {
        write!(out, ", aw {:.3}", aw)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "  Aggregated as '{}' ({}), SP {:.1}, PAC {:.1}",
        report.aggregate.id,
        report.aggregate.category,
        report.aggregate.sp.unwrap_or(0.0),
        report.aggregate.pac.unwrap_or(0.0)
    )?;

    for (rank, advice) in report.advice.iter().enumerate() {
        writeln!(
            out,
            "\n{}. {} (confidence {:.2}, {} storage)",
            rank + 1,
            advice.method,
            advice.confidence,
            advice.storage
        )?;
        for reason in &advice.rationale {
            writeln!(out, "   - {}", reason)?;
        }

        let targets = &advice.targets;
        let mut limits = Vec::new();
        if let Some(brix) = targets.brix_min {
            limits.push(format!("Brix >= {brix:.0}"));
        }
        if let Some(ph) = targets.ph_max {
            limits.push(format!("pH <= {ph:.1}"));
        }
        if let Some(aw) = targets.water_activity_max {
            limits.push(format!("aw <= {aw:.2}"));
        }
        if let Some(mm) = targets.particle_size_max_mm {
            limits.push(format!("particles <= {mm:.0} mm"));
        }
        if !limits.is_empty() {
            writeln!(out, "   Targets: {}", limits.join(", "))?;
        }
        writeln!(out, "   Packaging: {}", advice.packaging.join(", "))?;
        writeln!(out, "   Shelf life: {}", advice.shelf_life_hint)?;
        writeln!(
            out,
            "   Gelato impact: aroma retention {}, browning {}",
            advice.gelato_impact.aroma_retention, advice.gelato_impact.browning
        )?;
        for note in &advice.gelato_impact.notes {
            writeln!(out, "     {}", note)?;
        }
        if advice.requires_process_validation {
            writeln!(out, "   Requires process validation before release.")?;
        }
    }
    write_warnings(out, &report.warnings)
}

fn write_ingredient(out: &mut String, record: &IngredientRecord) -> fmt::Result {
    writeln!(out, "{} ({})", record.name, record.id)?;
    writeln!(out, "  Category      {}", record.category)?;
    if !record.aliases.is_empty() {
        writeln!(out, "  Aliases       {}", record.aliases.join(", "))?;
    }
    writeln!(out, "  Water         {:>7.2} %", record.water)?;
    writeln!(out, "  Fat           {:>7.2} %", record.fat)?;
    writeln!(out, "  Sugars        {:>7.2} %", record.sugars)?;
    writeln!(out, "  MSNF          {:>7.2} %", record.msnf)?;
    writeln!(out, "  Other solids  {:>7.2} %", record.other_solids)?;
    if let Some(sp) = record.sp {
        writeln!(out, "  SP            {:>7.2}", sp)?;
    }
    if let Some(pac) = record.pac {
        writeln!(out, "  PAC           {:>7.2}", pac)?;
    }
    if let Some(kind) = record.sugar_kind {
        writeln!(out, "  Sugar kind    {}", kind)?;
    }
    if let Some(split) = &record.sugar_split {
        writeln!(
            out,
            "  Sugar split   glucose {:.1}, fructose {:.1}, sucrose {:.1}",
            split.glucose, split.fructose, split.sucrose
        )?;
    }
    if let Some(cost) = record.cost_per_kg {
        writeln!(out, "  Cost          {:>7.2} /kg", cost)?;
    }
    Ok(())
}
