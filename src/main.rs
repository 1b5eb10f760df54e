use clap::Parser;
use std::process;
use vcfquery::cli::{args::Args, commands};

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(code) => {
            process::exit(code);
        }
        Err(error) => {
            // Error occurred - print to stderr and exit with error code
            eprintln!("Error: {:#}", error);
            process::exit(error.exit_code());
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("vcfquery - Streaming VCF Filter and Query Tool");
    println!("==============================================");
    println!();
    println!("Filter, count and transform Variant Call Format (VCF) records in a");
    println!("single streaming pass over a file or stdin.");
    println!();
    println!("USAGE:");
    println!("    vcfquery <COMMAND> [OPTIONS] [FILE]");
    println!();
    println!("COMMANDS:");
    println!("    filter      Emit records matching predicate expressions");
    println!("    count       Count records by a grouping key or labeled tallies");
    println!("    convert     Rewrite delimiter and header labels of the record stream");
    println!("    validate    Check well-formedness and report stream statistics");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # High-quality records on chromosome 1:");
    println!("    vcfquery filter variants.vcf -e 'chrom == \"chr1\" and qual > 80'");
    println!();
    println!("    # Single-nucleotide variants, projected as CSV:");
    println!("    vcfquery filter variants.vcf -e 'len(ref) == 1 and len(alt) == 1' \\");
    println!("                                 --fields chrom,pos,ref,alt --output-delimiter comma");
    println!();
    println!("    # Records per chromosome:");
    println!("    vcfquery count variants.vcf --by chrom");
    println!();
    println!("    # Independent quality tallies:");
    println!("    vcfquery count variants.vcf --where 'high=qual >= 50' --where 'low=qual < 50'");
    println!();
    println!("For detailed help on any command, use:");
    println!("    vcfquery <COMMAND> --help");
}
