use std::{env, fs, path::PathBuf};

fn url_arg() -> clap::Arg {
    clap::arg!(<URL> "Page URL")
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("shelfnote")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Shelfnote Contributors")
        .about("Create book and blog notes from web pages")
        .arg(
            clap::arg!(--config <FILE> "Configuration file")
                .global(true)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(--vault <DIR> "Vault directory notes and templates live in")
                .global(true)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--"api-key" <KEY> "Anthropic API key used for article summaries").global(true))
        .arg(clap::arg!(--model <MODEL> "Model used for article summaries").global(true))
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true))
        .subcommand_required(true)
        .subcommand(
            clap::Command::new("create")
                .about("Fetch a page and write a note for it into the vault")
                .arg(clap::arg!([URL] "Page URL"))
                .arg(
                    clap::arg!(--from <FILE> "Take the URL from this text file instead, near --cursor")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(clap::arg!(--cursor <OFFSET> "Byte offset in --from to look for a URL around").default_value("0"))
                .arg(
                    clap::arg!(--html <FILE> "Use this saved HTML instead of fetching the page")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            clap::Command::new("extract")
                .about("Extract metadata from a page without writing a note")
                .arg(url_arg())
                .arg(
                    clap::arg!(--html <FILE> "Use this saved HTML instead of fetching the page")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(clap::arg!(--json "Print the record as JSON")),
        )
        .subcommand(
            clap::Command::new("classify")
                .about("Show whether a URL is treated as a book listing or an article")
                .arg(url_arg()),
        )
        .subcommand(clap::Command::new("templates").about("List Markdown files in the vault"))
        .subcommand(clap::Command::new("folders").about("List folders in the vault"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "shelfnote", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "shelfnote", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "shelfnote", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "shelfnote", &completions_dir).unwrap();

    println!("cargo:warning=Shell completions generated in: {}", completions_dir.display());
}
