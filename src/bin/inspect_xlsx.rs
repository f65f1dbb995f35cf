//! Utility to dump a converted workbook for development
use surveyx::xlsx::XlsxReader;

fn main() {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: inspect_xlsx <workbook.xlsx>");
        std::process::exit(2);
    };

    let reader = match XlsxReader::open(&path) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("failed to open {}: {}", path, e);
            std::process::exit(1);
        }
    };

    println!("=== Parts in package ===");
    for file in reader.package().list_files() {
        println!("  {}", file);
    }

    let count = reader.sheet_count();
    for (idx, name) in reader.sheet_names().iter().enumerate() {
        println!("\n=== Sheet {}/{}: {} ===", idx + 1, count, name);
        match reader.read_sheet(idx) {
            Ok(sheet) => {
                for (row_idx, row) in sheet.rows.iter().enumerate().take(20) {
                    let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
                    println!("{:>4} | {}", row_idx + 1, cells.join("\t"));
                }
                if sheet.rows.len() > 20 {
                    println!("     ... {} more rows", sheet.rows.len() - 20);
                }
            }
            Err(e) => println!("  error: {}", e),
        }
    }
}
