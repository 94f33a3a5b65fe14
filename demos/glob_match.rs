//! Compile glob patterns and test paths against them.

fn main() {
    let paths = [
        "include/api.h",
        "include/detail/vector.hpp",
        "include/api_impl.h",
        "src/main.c",
    ];

    for pattern in ["*.h", "include/*.hpp", "[!s]*", "include/???.h"] {
        let glob = shipper::Glob::new(pattern).expect("invalid pattern");
        println!("{glob} ({} segments)", glob.segments().len());
        for path in paths {
            println!(
                "  {path}: strict={} loose={}",
                glob.test(path, true),
                glob.test(path, false)
            );
        }
    }

    // Compile errors point at the offending class.
    match shipper::Glob::new("include/[ab") {
        Ok(glob) => println!("Compiled {glob} (unexpected)"),
        Err(e) => {
            println!("Glob error: {e}");
            println!("{}", shipper::Error::from(e).render(""));
        }
    }
}
