use crate::cli::{VersionCommands, VersionPart};
use crate::output::UserOutput;
use hostkit::SemanticVersion;
use std::cmp::Ordering;

pub fn run_version(cmd: &VersionCommands, out: &dyn UserOutput) -> anyhow::Result<()> {
    match cmd {
        VersionCommands::Parse { version } => {
            let version: SemanticVersion = version.parse()?;
            out.status(&format!("major: {}", version.major));
            out.status(&format!("minor: {}", version.minor));
            out.status(&format!("patch: {}", version.patch));
            out.status(&format!(
                "addendum: {}",
                version.addendum.as_deref().unwrap_or("(none)")
            ));
        }
        VersionCommands::Compare { left, right } => {
            let left: SemanticVersion = left.parse()?;
            let right: SemanticVersion = right.parse()?;
            out.status(compare_symbol(&left, &right));
        }
        VersionCommands::Bump {
            version,
            part,
            addendum,
        } => {
            let version: SemanticVersion = version.parse()?;
            let next = bump(&version, *part, addendum.as_deref())?;
            out.status(&next.to_string());
        }
    }
    Ok(())
}

fn compare_symbol(left: &SemanticVersion, right: &SemanticVersion) -> &'static str {
    match left.cmp(right) {
        Ordering::Less => "<",
        Ordering::Equal => "=",
        Ordering::Greater => ">",
    }
}

fn bump(
    version: &SemanticVersion,
    part: VersionPart,
    addendum: Option<&str>,
) -> hostkit::Result<SemanticVersion> {
    let next = match part {
        VersionPart::Major => version.bump_major(),
        VersionPart::Minor => version.bump_minor(),
        VersionPart::Patch => version.bump_patch(),
    };
    match addendum {
        Some(addendum) => next.with_addendum(addendum),
        None => Ok(next),
    }
}
