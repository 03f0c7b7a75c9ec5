use owo_colors::OwoColorize;
use shelfnote_core::ExtractedRecord;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "Shelfnote".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Book and blog notes from web pages\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Print the fields of an extracted record
pub fn print_record(record: &ExtractedRecord) {
    println!("{}", "═".repeat(60).dimmed());
    println!("{}", format!("{:?} record", record.kind()).bold().cyan());
    println!("{}", "═".repeat(60).dimmed());

    match record {
        ExtractedRecord::Commerce(book) => {
            print_field("Title", &book.title);
            print_field("Author", &book.author);
            print_field("Genre", &book.category);
            if let Some(url) = &book.category_url {
                print_field("Genre link", url);
            }
            print_field("Source", &book.source_url);
            println!();
            println!("{}", book.description);
        }
        ExtractedRecord::Article(article) => {
            print_field("Title", &article.title);
            print_field("Source", &article.source_url);
            println!();
            println!("{}", article.summary);
        }
    }
}

fn print_field(label: &str, value: &str) {
    println!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}
