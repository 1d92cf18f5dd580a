// build.rs

fn main() {
    // Only the Xlib backend links a system library; Win32 comes in through the
    // import libraries shipped with the winapi crate.
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "linux" {
        return;
    }

    // Prefer pkg-config, which knows where the distribution put libX11.
    if let Err(e) = pkg_config::probe_library("x11") {
        eprintln!(
            "pkg-config failed for library 'x11' ({}). Falling back to manual linking.",
            e
        );
        println!("cargo:rustc-link-lib=X11");
        println!("cargo:rustc-link-search=/usr/lib");
        eprintln!("Manual linking flags applied. Ensure the X11 development library is installed.");
    } else {
        eprintln!("pkg-config found libX11. Linking configured automatically.");
    }
}
