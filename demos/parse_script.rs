//! Parse a project script and print it back.

fn main() {
    let input = "\
# library headers
base = './include'
header_match = '*.h', '*.hpp'
command = copy, '__base__', out
command = clean, tmp
";

    let document = shipper::parse(input).expect("parse failed");

    println!("Keys: {}", document.len());
    for (key, value) in document.iter() {
        println!("  {key}: {} ({})", value, value.kind());
    }

    if let Some(commands) = document.get("command") {
        for group in commands.groups() {
            println!("  Command group: {group:?}");
        }
    }

    println!("\nDump:\n{document}");

    // Errors carry a location and render against the script.
    let broken = "name = demo\nflags = -O2 -g\n";
    if let Err(e) = shipper::parse(broken) {
        println!("Parse error: {e}");
        println!("  Category: {:?}", e.category());
        println!("{}", shipper::Error::from(e).render(broken));
    }
}
