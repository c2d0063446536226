use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::error::{NotFoundError, Result};
use crate::video::types::ClipRef;

/// List every background clip in `directory`, sorted by path
///
/// Only regular files with an accepted container extension count;
/// subdirectories and anything else are skipped.
pub fn discover_candidates<P: AsRef<Path>>(directory: P) -> Result<Vec<ClipRef>> {
    let directory = directory.as_ref();
    info!("Searching for video files in: {}", directory.display());

    if !directory.is_dir() {
        return Err(NotFoundError::MissingDirectory {
            path: directory.display().to_string(),
        }
        .into());
    }

    let mut clips = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        match ClipRef::from_path(&path) {
            Some(clip) => clips.push(clip),
            None => debug!("Skipping non-video file: {}", path.display()),
        }
    }

    // read_dir order is platform-specific; sorting keeps seeded picks stable
    clips.sort_by(|a, b| a.path().cmp(b.path()));

    let names: Vec<String> = clips.iter().map(ClipRef::name).collect();
    info!("Found {} video files: {:?}", clips.len(), names);

    Ok(clips)
}

/// Pick one background clip uniformly at random from `directory`
pub fn select_candidate<P: AsRef<Path>, R: Rng + ?Sized>(
    directory: P,
    rng: &mut R,
) -> Result<ClipRef> {
    let directory = directory.as_ref();
    let clips = discover_candidates(directory)?;

    let selected = clips.choose(rng).cloned().ok_or_else(|| NotFoundError::NoCandidates {
        path: directory.display().to_string(),
    })?;

    info!("Selected background video: {}", selected.name());
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReelError;
    use crate::video::types::ContainerFormat;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"not really a video").unwrap();
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("nope");
        let mut rng = StdRng::seed_from_u64(0);

        let result = select_candidate(&missing, &mut rng);
        assert!(matches!(
            result,
            Err(ReelError::NotFound(NotFoundError::MissingDirectory { .. }))
        ));
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let result = select_candidate(temp_dir.path(), &mut rng);
        assert!(matches!(
            result,
            Err(ReelError::NotFound(NotFoundError::NoCandidates { .. }))
        ));
    }

    #[test]
    fn test_only_allowed_extensions_are_candidates() {
        let temp_dir = tempdir().unwrap();
        touch(temp_dir.path(), "a.mp4");
        touch(temp_dir.path(), "b.MOV");
        touch(temp_dir.path(), "c.webm");
        touch(temp_dir.path(), "d.avi");
        touch(temp_dir.path(), "notes.txt");
        touch(temp_dir.path(), "e.mkv");
        fs::create_dir(temp_dir.path().join("nested.mp4")).unwrap();
        touch(&temp_dir.path().join("nested.mp4"), "inner.mp4");

        let clips = discover_candidates(temp_dir.path()).unwrap();
        let names: Vec<String> = clips.iter().map(ClipRef::name).collect();
        assert_eq!(names, vec!["a.mp4", "b.MOV", "c.webm", "d.avi"]);

        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = HashSet::new();
        for _ in 0..100 {
            let clip = select_candidate(temp_dir.path(), &mut rng).unwrap();
            assert!(ContainerFormat::ALL.contains(&clip.format()));
            seen.insert(clip.name());
        }
        // Uniform choice over four clips reaches all of them in 100 draws
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_directory_with_only_unsupported_files() {
        let temp_dir = tempdir().unwrap();
        touch(temp_dir.path(), "readme.md");
        touch(temp_dir.path(), "clip.mkv");
        let mut rng = StdRng::seed_from_u64(5);

        assert!(matches!(
            select_candidate(temp_dir.path(), &mut rng),
            Err(ReelError::NotFound(NotFoundError::NoCandidates { .. }))
        ));
    }

    #[test]
    fn test_seeded_selection_is_reproducible() {
        let temp_dir = tempdir().unwrap();
        for name in ["one.mp4", "two.mp4", "three.mp4", "four.mp4", "five.mp4"] {
            touch(temp_dir.path(), name);
        }

        let first = select_candidate(temp_dir.path(), &mut StdRng::seed_from_u64(21)).unwrap();
        let second = select_candidate(temp_dir.path(), &mut StdRng::seed_from_u64(21)).unwrap();
        assert_eq!(first, second);
    }
}
