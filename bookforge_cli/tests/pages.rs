mod common;

use bookforge_core::AnyEmptyResult;

#[test]
fn pages_use_file_names_in_explicit_mode() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "SUMMARY.md", "- [Intro](intro.md)\n- [Guide](guide/Getting Started.md)\n")?;
	common::write_file(tmp.path(), "intro.md", "# Introduction\n")?;
	common::write_file(tmp.path(), "guide/Getting Started.md", "# Getting Started\n")?;

	let mut cmd = common::bookforge_cmd();
	cmd.arg("pages")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("intro.html\tIntroduction\nGetting Started.html\tGetting Started\n");

	Ok(())
}

#[test]
fn pages_use_title_slugs_in_graph_mode() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "Tasks_all.csv", "Name,Status\n123,Done\n456,Open\n")?;
	common::write_file(tmp.path(), "Tasks/123 My Task.md", "# My Task\n")?;
	common::write_file(tmp.path(), "Tasks/456 Other.md", "# Other!\n")?;

	let mut cmd = common::bookforge_cmd();
	cmd.arg("pages")
		.arg("--mode")
		.arg("notion")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("tasks.html\tTasks\nmy-task.html\tMy Task\nother.html\tOther!\n");

	Ok(())
}
