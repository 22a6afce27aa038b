use cardforge::catalog::{AttributeVector, BaselineState, CardCatalog};
use cardforge::evaluator::Evaluation;
use cardforge::optimizer::runner::SessionStats;
use cardforge::pool::{PoolEntry, Recommendation, RecommendationKind};
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum OutputFormat {
    Table,
    Json,
}

fn dim_headers(first: &str, dims: usize) -> Vec<Cell> {
    let mut row = vec![Cell::new(first).add_attribute(Attribute::Bold)];
    for d in 0..dims {
        row.push(Cell::new(format!("A{}", d)).add_attribute(Attribute::Bold));
    }
    row
}

fn value_cell(v: i64) -> Cell {
    let cell = Cell::new(v).set_alignment(CellAlignment::Right);
    if v < 0 {
        cell.fg(Color::Red)
    } else if v > 0 {
        cell.fg(Color::Green)
    } else {
        cell
    }
}

fn vector_row(label: impl Into<String>, v: &AttributeVector) -> Vec<Cell> {
    let mut row = vec![Cell::new(label.into())];
    row.extend(v.as_slice().iter().map(|&x| value_cell(x)));
    row
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn print_catalog(catalog: &CardCatalog, baseline: &BaselineState) {
    println!("\nBaseline: {}", baseline.state());

    let mut table = new_table();
    let mut header = dim_headers("Card", catalog.dims());
    header.insert(1, Cell::new("Source").add_attribute(Attribute::Bold));
    header.push(Cell::new("Sum").fg(Color::Cyan));
    table.set_header(header);

    for card in catalog.iter() {
        let mut row = vector_row(card.id.to_string(), &card.delta);
        let source = card
            .source_id
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        row.insert(1, Cell::new(source));
        row.push(value_cell(card.delta.sum()).fg(Color::Cyan));
        table.add_row(row);
    }
    println!("{}", table);
}

pub fn print_recommendations(recs: &[Recommendation]) {
    if recs.is_empty() {
        println!("\nNo viable combination found.");
        return;
    }

    for rec in recs {
        let title = match rec.kind {
            RecommendationKind::BestScore => "🏆 BEST SCORE",
            RecommendationKind::CleanGain => "🧼 BEST CLEAN GAIN",
        };
        println!("\n=== {} ===", title);
        let seq: Vec<String> = rec.sequence.iter().map(|id| id.to_string()).collect();
        println!("Sequence: {}", seq.join(", "));
        println!("Score: {}", rec.score);

        let mut table = new_table();
        table.set_header(dim_headers("", rec.final_state.dims()));
        table.add_row(vector_row("Final", &rec.final_state));
        table.add_row(vector_row("Net", &rec.net_gain));
        println!("{}", table);
    }
}

pub fn print_step_trace(sequence: &[usize], trace: &[AttributeVector]) {
    let Some(first) = trace.first() else {
        return;
    };
    let mut table = new_table();
    table.set_header(dim_headers("Step", first.dims()));
    for (i, state) in trace.iter().enumerate() {
        let label = if i == 0 {
            "start".to_string()
        } else {
            format!("#{} card {}", i, sequence[i - 1])
        };
        table.add_row(vector_row(label, state));
    }
    println!("{}", table);
}

pub fn print_evaluation(sequence: &[usize], eval: &Evaluation) {
    let seq: Vec<String> = sequence.iter().map(|id| id.to_string()).collect();
    println!("\nSequence: {}", seq.join(", "));
    println!("Valid: {}", eval.valid);
    println!("Score: {}", eval.score);

    let mut table = new_table();
    table.set_header(dim_headers("", eval.final_state.dims()));
    table.add_row(vector_row("Final", &eval.final_state));
    table.add_row(vector_row("Net", &eval.net_gain));
    println!("{}", table);

    print_step_trace(sequence, &eval.step_trace);
}

pub fn print_ranked(entries: &[&PoolEntry], limit: usize) {
    if entries.is_empty() || limit == 0 {
        return;
    }
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Sequence").add_attribute(Attribute::Bold),
        Cell::new("Score").fg(Color::Cyan),
        Cell::new("Net Gain"),
        Cell::new("Clean"),
    ]);
    for (rank, entry) in entries.iter().take(limit).enumerate() {
        let e = &entry.evaluation;
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(entry.combination.to_string()),
            Cell::new(e.score).fg(Color::Cyan),
            Cell::new(e.net_gain.to_string()),
            Cell::new(if e.is_clean_gain() { "yes" } else { "no" }),
        ]);
    }
    println!("\nDistinct solutions ({} total):", entries.len());
    println!("{}", table);
}

pub fn print_session_stats(stats: &SessionStats) {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Runs"),
        Cell::new("Found"),
        Cell::new("No Gain"),
        Cell::new("Exhausted"),
        Cell::new("Iterations"),
        Cell::new("Accepted"),
        Cell::new("Restarts"),
        Cell::new("Cache"),
        Cell::new("Elapsed"),
    ]);
    table.add_row(vec![
        Cell::new(stats.runs_completed),
        Cell::new(stats.runs_found),
        Cell::new(stats.runs_no_gain),
        Cell::new(stats.runs_exhausted),
        Cell::new(stats.iterations),
        Cell::new(stats.accepted),
        Cell::new(stats.restarts),
        Cell::new(format!("{} / {} hits", stats.cache.len, stats.cache.hits)),
        Cell::new(format!("{:.2?}", stats.elapsed)),
    ]);
    println!("{}", table);
}
