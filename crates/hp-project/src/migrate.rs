//! Schema migration framework.

use crate::ProjectError;
use crate::schema::Study;

pub const LATEST_VERSION: u32 = 2;

pub fn migrate_to_latest(mut study: Study) -> Result<Study, ProjectError> {
    while study.version < LATEST_VERSION {
        study = migrate_one_version(study)?;
    }
    Ok(study)
}

fn migrate_one_version(study: Study) -> Result<Study, ProjectError> {
    match study.version {
        0 => migrate_v0_to_v1(study),
        1 => migrate_v1_to_v2(study),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

fn migrate_v0_to_v1(mut study: Study) -> Result<Study, ProjectError> {
    study.version = 1;
    Ok(study)
}

/// Version 1 stored the sink duty with the network sign convention
/// (heat leaving the cycle is negative). Version 2 stores it as a positive
/// heat delivery, for the design point and inline dataset records alike.
fn migrate_v1_to_v2(mut study: Study) -> Result<Study, ProjectError> {
    use crate::schema::DatasetSourceDef;

    study.design.sink.duty_kw = study.design.sink.duty_kw.abs();
    if let Some(replay) = study.replay.as_mut()
        && let DatasetSourceDef::Inline { records } = &mut replay.dataset
    {
        for record in records {
            record.sink.duty_kw = record.sink.duty_kw.abs();
        }
    }

    study.version = 2;
    Ok(study)
}
