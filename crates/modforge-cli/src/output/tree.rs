//! Installed module tree rendering.

use std::path::Path;

use modforge_installer::InstalledModule;

use super::colors::ColorSupport;

/// Render installed modules beneath the install directory
///
/// ```text
/// /etc/modules
/// └─┬ pmtacceptance-apollo (v0.0.2)
///   ├── pmtacceptance-java (v1.7.1)
///   └── pmtacceptance-stdlib (v1.0.0)
/// ```
pub fn render_tree(target: &Path, modules: &[InstalledModule], colors: &ColorSupport) -> String {
    let mut output = format!("{}\n", target.display());
    render_level(&mut output, modules, "", colors);
    output
}

fn render_level(
    output: &mut String,
    modules: &[InstalledModule],
    prefix: &str,
    colors: &ColorSupport,
) {
    for (index, module) in modules.iter().enumerate() {
        let last = index + 1 == modules.len();
        let branch = if last { "└─" } else { "├─" };
        let joint = if module.dependencies.is_empty() { "─" } else { "┬" };
        let version = format!("(v{})", module.version.vstring);

        output.push_str(&format!(
            "{}{}{} {} {}\n",
            prefix,
            branch,
            joint,
            module.module,
            colors.dim(&version)
        ));

        let child_prefix = format!("{}{}", prefix, if last { "  " } else { "│ " });
        render_level(output, &module.dependencies, &child_prefix, colors);
    }
}
