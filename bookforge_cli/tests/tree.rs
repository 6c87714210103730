mod common;

use bookforge_core::AnyEmptyResult;
use serde_json::Value;

fn write_explicit_book(root: &std::path::Path) -> std::io::Result<()> {
	common::write_file(
		root,
		"README.md",
		"# My Book\n\n* [Introduction](intro.md)\n* [Setup Guide](guide/setup.md)\n",
	)?;
	common::write_file(root, "intro.md", "# Introduction\n\nWelcome.\n")?;
	common::write_file(root, "guide/setup.md", "# Setup\n\n## Install\n")
}

#[test]
fn tree_prints_entry_file_chapters() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_explicit_book(tmp.path())?;

	let mut cmd = common::bookforge_cmd();
	cmd.arg("tree")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("Root\n  Introduction\n  Setup\n");

	Ok(())
}

#[test]
fn tree_follows_links_in_graph_mode() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "P.md", "# Parent\n\n[x](X.md)\n")?;
	common::write_file(tmp.path(), "X.md", "# X\n\n[y](Y.md)\n")?;
	common::write_file(tmp.path(), "Y.md", "# Y\n\n[back](X.md)\n")?;

	let mut cmd = common::bookforge_cmd();
	cmd.arg("tree")
		.arg("--path")
		.arg(tmp.path())
		.arg("--mode")
		.arg("graph")
		.arg("--title")
		.arg("Workspace")
		.assert()
		.success()
		.stdout("Workspace\n  Parent\n    X\n      Y\n");

	Ok(())
}

#[test]
fn tree_reads_mode_from_config_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "bookforge.toml", "mode = \"notion\"\ntitle = \"Export\"\n")?;
	common::write_file(tmp.path(), "Tasks_all.csv", "Name,Status\n123,Done\n")?;
	common::write_file(tmp.path(), "Tasks/123 My Task.md", "# My Task\n")?;

	let mut cmd = common::bookforge_cmd();
	cmd.arg("tree")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("Export\n  Tasks\n    My Task\n");

	Ok(())
}

#[test]
fn tree_ignore_flag_overrides_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "a.md", "# Alpha\n")?;
	common::write_file(tmp.path(), "drafts/b.md", "# Draft\n")?;
	common::write_file(tmp.path(), "notes/c.md", "# Notes\n")?;

	let mut cmd = common::bookforge_cmd();
	cmd.arg("tree")
		.arg("--path")
		.arg(tmp.path())
		.arg("--ignore")
		.arg("drafts,notes")
		.assert()
		.success()
		.stdout("Root\n  Alpha\n");

	Ok(())
}

#[test]
fn tree_reports_empty_books() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::bookforge_cmd();
	cmd.arg("tree")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("(no documents found)"));

	Ok(())
}

#[test]
fn tree_json_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_explicit_book(tmp.path())?;

	let mut cmd = common::bookforge_cmd();
	let output = cmd
		.arg("tree")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;

	assert!(output.status.success());
	let json: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json["title"], "Root");
	assert_eq!(json["children"][0]["title"], "Introduction");
	assert_eq!(json["children"][1]["headings"][0]["children"][0]["id"], "install");

	Ok(())
}

#[test]
fn tree_rejects_unsupported_input() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "notes.txt", "plain text")?;

	let mut cmd = common::bookforge_cmd();
	cmd.arg("tree")
		.arg("--path")
		.arg(tmp.path().join("notes.txt"))
		.assert()
		.code(2)
		.stderr(predicates::str::contains("bookforge::unsupported_input"));

	Ok(())
}

#[test]
fn tree_reports_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "bookforge.toml", "mode = \"sideways\"\n")?;

	let mut cmd = common::bookforge_cmd();
	cmd.arg("tree")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("bookforge::config_parse"));

	Ok(())
}

#[test]
fn missing_subcommand_fails() {
	let mut cmd = common::bookforge_cmd();
	cmd.assert()
		.code(1)
		.stderr(predicates::str::contains("No subcommand specified"));
}
