//! Checks that the unit test tree mirrors `src/` and that every test file is wired and non-empty

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::path::Path;

    const SRC_DIR: &str = "src";
    const UNIT_DIR: &str = "tests/unit";
    const MODULES: [&str; 5] = ["algorithm", "io", "math", "services", "spatial"];

    // Files that only organize modules or start a binary
    fn is_wiring(relative: &str) -> bool {
        matches!(relative, "lib.rs" | "main.rs") || relative.ends_with("mod.rs")
    }

    fn source_files(dir: &Path, base: &Path, out: &mut BTreeSet<String>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                source_files(&path, base, out)?;
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some("rs") {
                continue;
            }
            let Ok(relative) = path.strip_prefix(base) else {
                return Err(io::Error::other("Failed to strip prefix"));
            };
            out.insert(relative.to_string_lossy().replace('\\', "/"));
        }
        Ok(())
    }

    fn collect(dir: &str) -> BTreeSet<String> {
        let root = Path::new(dir);
        let mut files = BTreeSet::new();
        if let Err(error) = source_files(root, root, &mut files) {
            assert!(!root.exists(), "Failed to read {dir}: {error}");
        }
        files.retain(|relative| !is_wiring(relative));
        files
    }

    fn declared_modules(mod_file: &Path) -> BTreeSet<String> {
        fs::read_to_string(mod_file)
            .unwrap_or_default()
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                line.strip_prefix("pub mod ")
                    .or_else(|| line.strip_prefix("mod "))
                    .and_then(|rest| rest.strip_suffix(';'))
                    .map(str::to_owned)
            })
            .collect()
    }

    // Tests every engine module has a unit test file at the same relative path
    // Verified by adding a src file without a counterpart
    #[test]
    fn test_all_src_files_have_unit_tests() {
        let tests = collect(UNIT_DIR);
        let missing: Vec<String> = collect(SRC_DIR)
            .into_iter()
            .filter(|relative| !tests.contains(relative))
            .map(|relative| format!("  - src/{relative} -> tests/unit/{relative}"))
            .collect();
        assert!(
            missing.is_empty(),
            "Source files without unit tests:\n{}",
            missing.join("\n")
        );
    }

    // Tests no unit test file outlives the module it covers
    // Verified by leaving a test for a deleted module
    #[test]
    fn test_all_unit_tests_have_src_counterparts() {
        let sources = collect(SRC_DIR);
        let orphaned: Vec<String> = collect(UNIT_DIR)
            .into_iter()
            .filter(|relative| !sources.contains(relative))
            .map(|relative| format!("  - tests/unit/{relative} (src/{relative} missing)"))
            .collect();
        assert!(
            orphaned.is_empty(),
            "Unit tests without source files:\n{}",
            orphaned.join("\n")
        );
    }

    // Tests the crate root and the unit tree declare the same top-level modules
    // Verified by dropping a module from tests/unit/mod.rs
    #[test]
    fn test_top_level_modules_match() {
        let expected: BTreeSet<String> = MODULES.iter().map(|name| (*name).to_owned()).collect();
        assert_eq!(declared_modules(&Path::new(SRC_DIR).join("lib.rs")), expected);
        assert_eq!(declared_modules(&Path::new(UNIT_DIR).join("mod.rs")), expected);
    }

    // Tests each unit file is reachable from tests/main.rs through the mod.rs chain
    // Verified by forgetting a `pub mod` line for a new test file
    #[test]
    fn test_unit_files_are_wired() {
        let roots = declared_modules(Path::new("tests/main.rs"));
        assert!(roots.contains("unit") && roots.contains("meta"), "tests/main.rs: {roots:?}");

        let mut unwired = Vec::new();
        for relative in collect(UNIT_DIR) {
            let path = Path::new(UNIT_DIR).join(&relative);
            let (Some(parent), Some(stem)) = (path.parent(), path.file_stem()) else {
                continue;
            };
            let stem = stem.to_string_lossy();
            if !declared_modules(&parent.join("mod.rs")).contains(stem.as_ref()) {
                unwired.push(format!("  - tests/unit/{relative}"));
            }
        }
        assert!(
            unwired.is_empty(),
            "Unit test files missing from their mod.rs:\n{}",
            unwired.join("\n")
        );
    }

    // Tests every test file outside the wiring files contains at least one test
    // Verified by adding an empty test file
    #[test]
    fn test_all_test_files_contain_tests() {
        let root = Path::new("tests");
        let mut files = BTreeSet::new();
        if let Err(error) = source_files(root, root, &mut files) {
            assert!(!root.exists(), "Failed to scan tests: {error}");
        }
        let empty: Vec<String> = files
            .into_iter()
            .filter(|relative| !is_wiring(relative))
            .filter(|relative| {
                fs::read_to_string(root.join(relative))
                    .is_ok_and(|content| !content.contains("#[test]"))
            })
            .map(|relative| format!("  - tests/{relative}"))
            .collect();
        assert!(
            empty.is_empty(),
            "Test files without any #[test] functions:\n{}",
            empty.join("\n")
        );
    }
}
