use crate::cli::SchemaArgs;
use crate::error::Result;
use hhxtruth::engine::schema;

pub fn run(args: SchemaArgs) -> Result<()> {
    println!("{}", render(&args));
    Ok(())
}

fn render(args: &SchemaArgs) -> String {
    let names = schema::branch_names();
    if args.header {
        names.join(",")
    } else {
        names.join("\n")
    }
}
