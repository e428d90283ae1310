use anyhow::{Context, Result};
use chrono::Duration;
use plotters::prelude::*;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::analysis::aggregator::AggregateReport;
use crate::analysis::categorizer::Category;

const CHART_SIZE: (u32, u32) = (800, 600);

const LEVEL_BAR_COLOR: RGBColor = RGBColor(66, 133, 244);

const CATEGORY_COLORS: [RGBColor; 3] = [
    RGBColor(66, 133, 244),
    RGBColor(219, 68, 55),
    RGBColor(244, 180, 0),
];

const PIE_COLORS: [RGBColor; 10] = [
    RGBColor(66, 133, 244),
    RGBColor(219, 68, 55),
    RGBColor(244, 180, 0),
    RGBColor(15, 157, 88),
    RGBColor(171, 71, 188),
    RGBColor(0, 172, 193),
    RGBColor(255, 112, 67),
    RGBColor(158, 157, 36),
    RGBColor(92, 107, 192),
    RGBColor(240, 98, 146),
];

/// Render every chart the report has data for, plus the text summary.
///
/// Artifact names are stable and overwritten on each run. A section with no
/// backing data is skipped rather than failing the whole render.
pub fn render(report: &AggregateReport, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create report directory {}", out_dir.display()))?;

    let mut artifacts = Vec::new();

    if !report.levels.is_empty() {
        let path = out_dir.join("level_distribution.svg");
        level_distribution_chart(report, &path)?;
        artifacts.push(path);
    } else {
        debug!("No level data, skipping level distribution chart");
    }

    if !report.top_topics.is_empty() {
        let path = out_dir.join("topic_breakdown.svg");
        topic_breakdown_chart(report, &path)?;
        artifacts.push(path);
    } else {
        debug!("No topics recorded, skipping topic breakdown chart");
    }

    if !report.daily.is_empty() {
        let path = out_dir.join("responses_per_day.svg");
        responses_per_day_chart(report, &path)?;
        artifacts.push(path);
    } else {
        debug!("No daily data, skipping timeline chart");
    }

    if !report.levels.is_empty() {
        let path = out_dir.join("category_scores.svg");
        category_scores_chart(report, &path)?;
        artifacts.push(path);
    }

    let summary_path = out_dir.join("summary.txt");
    fs::write(&summary_path, text_summary(report))
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;
    artifacts.push(summary_path);

    Ok(artifacts)
}

fn level_distribution_chart(report: &AggregateReport, path: &Path) -> Result<()> {
    let labels: Vec<String> = report.levels.keys().map(|level| level.to_string()).collect();
    let counts: Vec<u64> = report.levels.values().map(|stats| stats.count).collect();
    let max = counts.iter().copied().max().unwrap_or(1) as f64;

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Responses by level", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..labels.len() as f64, 0f64..max * 1.2)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|x| {
            labels
                .get(*x as usize)
                .cloned()
                .unwrap_or_default()
        })
        .y_desc("responses")
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(i, &count)| {
        Rectangle::new(
            [(i as f64 + 0.2, 0.0), (i as f64 + 0.8, count as f64)],
            LEVEL_BAR_COLOR.mix(0.7).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

fn topic_breakdown_chart(report: &AggregateReport, path: &Path) -> Result<()> {
    let sizes: Vec<f64> = report.top_topics.iter().map(|(_, count)| *count as f64).collect();
    let labels: Vec<String> = report
        .top_topics
        .iter()
        .map(|(topic, count)| format!("{} ({})", topic, count))
        .collect();
    let colors: Vec<RGBColor> = (0..sizes.len())
        .map(|i| PIE_COLORS[i % PIE_COLORS.len()])
        .collect();

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    root.titled("Top topics", ("sans-serif", 28))?;

    let center = (CHART_SIZE.0 as i32 / 2, CHART_SIZE.1 as i32 / 2);
    let radius = 200.0;
    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
    root.draw(&pie)?;

    root.present()?;
    Ok(())
}

fn responses_per_day_chart(report: &AggregateReport, path: &Path) -> Result<()> {
    let first = report.daily.first().map(|(day, _)| *day).unwrap_or_default();
    let mut last = report.daily.last().map(|(day, _)| *day).unwrap_or_default();
    if last == first {
        // A single-day series still needs a non-degenerate axis.
        last = first + Duration::days(1);
    }
    let max = report
        .daily
        .iter()
        .map(|(_, count)| *count)
        .max()
        .unwrap_or(1) as f64;

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Responses per day", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(50)
        .build_cartesian_2d(first..last, 0f64..max * 1.2)?;

    chart.configure_mesh().y_desc("responses").draw()?;

    chart.draw_series(LineSeries::new(
        report.daily.iter().map(|(day, count)| (*day, *count as f64)),
        &LEVEL_BAR_COLOR,
    ))?;
    chart.draw_series(
        report
            .daily
            .iter()
            .map(|(day, count)| Circle::new((*day, *count as f64), 4, LEVEL_BAR_COLOR.filled())),
    )?;

    root.present()?;
    Ok(())
}

fn category_scores_chart(report: &AggregateReport, path: &Path) -> Result<()> {
    let labels: Vec<String> = report.levels.keys().map(|level| level.to_string()).collect();

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Mean category scores by level", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..labels.len() as f64, 0f64..110f64)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|x| {
            labels
                .get(*x as usize)
                .cloned()
                .unwrap_or_default()
        })
        .y_desc("mean score")
        .draw()?;

    for (ci, category) in Category::ALL.into_iter().enumerate() {
        let color = CATEGORY_COLORS[ci];
        let bars: Vec<Rectangle<(f64, f64)>> = report
            .levels
            .values()
            .enumerate()
            .map(|(li, stats)| {
                let x0 = li as f64 + 0.125 + ci as f64 * 0.25;
                Rectangle::new(
                    [(x0, 0.0), (x0 + 0.2, stats.mean_scores.get(category))],
                    color.mix(0.8).filled(),
                )
            })
            .collect();
        chart
            .draw_series(bars)?
            .label(category.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 4), (x + 12, y + 4)], color.filled()));
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

fn text_summary(report: &AggregateReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Survey response report");
    let _ = writeln!(out, "======================");
    let _ = writeln!(out);
    let _ = writeln!(out, "Total responses: {}", report.total);

    if !report.levels.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Responses by level");
        let _ = writeln!(out, "------------------");
        let _ = writeln!(
            out,
            "{:<12} {:>6}  {:<20} {:<20}",
            "level", "count", "first", "last"
        );
        for (level, stats) in &report.levels {
            let _ = writeln!(
                out,
                "{:<12} {:>6}  {:<20} {:<20}",
                level.to_string(),
                stats.count,
                stats.first.format("%Y-%m-%d %H:%M:%S"),
                stats.last.format("%Y-%m-%d %H:%M:%S"),
            );
        }
    }

    if !report.top_topics.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Top topics");
        let _ = writeln!(out, "----------");
        for (topic, count) in &report.top_topics {
            let _ = writeln!(out, "{:<24} {:>6}", topic, count);
        }
    }

    if !report.voice_questions.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Voice questions");
        let _ = writeln!(out, "---------------");
        for question in &report.voice_questions {
            let _ = writeln!(out, "- {}", question);
        }
    }

    if !report.clarified_questions.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Clarified questions");
        let _ = writeln!(out, "-------------------");
        for question in &report.clarified_questions {
            let _ = writeln!(out, "- {}", question);
        }
    }

    if !report.daily.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Responses per day");
        let _ = writeln!(out, "-----------------");
        for (day, count) in &report.daily {
            let _ = writeln!(out, "{}  {:>6}", day, count);
        }
    }

    if !report.levels.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Mean category scores");
        let _ = writeln!(out, "--------------------");
        let _ = writeln!(
            out,
            "{:<12} {:>10} {:>10} {:>12}",
            "level", "technical", "business", "theoretical"
        );
        for (level, stats) in &report.levels {
            let _ = writeln!(
                out,
                "{:<12} {:>10.1} {:>10.1} {:>12.1}",
                level.to_string(),
                stats.mean_scores.technical,
                stats.mean_scores.business,
                stats.mean_scores.theoretical,
            );
        }
    }

    out
}
