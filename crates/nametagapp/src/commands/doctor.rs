use crate::commands::{plural, CmdMessage, CmdResult};
use crate::error::Result;
use crate::library::Library;
use crate::rename_log::RenameLog;
use crate::store::PersistenceStore;

pub fn run<S: PersistenceStore, L: RenameLog>(
    lib: &mut Library<S, L>,
    fix: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for warning in lib.warnings() {
        result.add_message(CmdMessage::warning(format!("Store was unreadable: {}", warning)));
    }

    let report = lib.verify(fix);
    if report.is_clean() {
        result.add_message(CmdMessage::success("No inconsistencies found."));
        return Ok(result);
    }

    result.add_message(CmdMessage::warning("Inconsistencies found:"));
    if !report.healed.is_empty() {
        result.add_message(CmdMessage::success(format!(
            "  - Re-read tags from the names of {} file{}.",
            report.healed.len(),
            plural(report.healed.len())
        )));
    }
    if !report.missing.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "  - {} tagged file{} missing from disk:",
            report.missing.len(),
            plural(report.missing.len())
        )));
        for key in &report.missing {
            result.add_message(CmdMessage::info(format!("      {}", key)));
        }
        if report.forgotten.is_empty() {
            result.add_message(CmdMessage::info(
                "    Run 'nametag doctor --fix' to forget them.",
            ));
        } else {
            result.add_message(CmdMessage::success(format!(
                "  - Forgot {} missing file{}.",
                report.forgotten.len(),
                plural(report.forgotten.len())
            )));
        }
    }
    result.note_flush(report.flush.as_ref());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    #[test]
    fn doctor_no_inconsistencies() {
        let mut env = TestEnv::with(&[], &["a @x.jpg"]);

        let result = run(&mut env.lib, false).unwrap();

        assert_eq!(result.messages.len(), 1);
        assert!(result.messages[0].content.contains("No inconsistencies"));
    }

    #[test]
    fn doctor_reports_then_forgets_missing() {
        let mut env = TestEnv::with(&[], &["a @x.jpg"]);
        std::fs::remove_file(env.path("a @x.jpg")).unwrap();

        let result = run(&mut env.lib, false).unwrap();
        assert!(result
            .messages
            .iter()
            .any(|m| m.content.contains("1 tagged file missing")));
        assert!(result.messages.iter().any(|m| m.content.contains("--fix")));

        let result = run(&mut env.lib, true).unwrap();
        assert!(result
            .messages
            .iter()
            .any(|m| m.content.contains("Forgot 1 missing file")));
        assert!(env.lib.ever_tagged().is_empty());
    }
}
