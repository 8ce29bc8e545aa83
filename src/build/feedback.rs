use colored::*;

/// Turns raw toolchain output into a short hint for the user.
pub struct FeedbackAnalyzer;

impl FeedbackAnalyzer {
    pub fn analyze(output: &str) -> Option<String> {
        // Compiler binary could not be spawned
        if output.starts_with("Failed to execute") {
            return Some(format!(
                "The {} could not be started.\nCheck the target's {} and {} in project.json, or install it on PATH.",
                "compiler".bold().red(),
                "prefix".bold().yellow(),
                "location".bold().yellow()
            ));
        }

        if output.contains("undefined reference to `main'") {
            return Some(format!(
                "Your project is missing a {} function.\nOne of the files in {} must define it.",
                "main()".bold().yellow(),
                "code.src".bold().green()
            ));
        }

        if output.contains("undefined reference to") {
            return Some(format!(
                "It looks like a {} error.\nA source file may be missing from {} or a library from {}.",
                "Linker".bold().red(),
                "code.src".bold().yellow(),
                "libs".bold().yellow()
            ));
        }

        if output.contains("fatal error: ") && output.contains("No such file or directory") {
            return Some(format!(
                "It looks like a {} error.\nList the header in {} so its directory is searched.",
                "Missing Header".bold().red(),
                "code.inc".bold().yellow()
            ));
        }

        None
    }
}
