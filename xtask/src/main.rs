/// Packages the plugin for hosts. Usage:
///
///   cargo xtask bundle ring-delay --release
///
/// Builds `ring-delay` as a cdylib and writes `Ring Delay.clap` and
/// `Ring Delay.vst3` to `target/bundled/`. The AUv2 entry point from
/// `clap_wrapper::export_auv2!()` lives in the same binary, so the bundled
/// plugin can also be wrapped as an Audio Unit component.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
