mod common;

use bookforge_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;

#[test]
fn render_outputs_html_with_template_tags() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(
		tmp.path(),
		"page.md",
		"# Getting Started\n\n{% hint style=\"success\" %}\nAll set.\n{% endhint %}\n\n{% include \
		 \"parts/footer.md\" %}\n",
	)?;
	common::write_file(tmp.path(), "parts/footer.md", "Footer text\n")?;

	let mut cmd = common::bookforge_cmd();
	cmd.arg("render")
		.arg(tmp.path().join("page.md"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(
			predicates::str::contains(
				"<h1 id=\"getting-started\"><a href=\"#getting-started\" class=\"anchor\"></a>Getting \
				 Started</h1>",
			)
			.and(predicates::str::contains("<div class=\"gb-hint gb-success\">"))
			.and(predicates::str::contains("<p>Footer text</p>")),
		);

	Ok(())
}

#[test]
fn render_keeps_unknown_tags() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(
		tmp.path(),
		"page.md",
		"{% embed url=\"https://example.com\" %}\nCaption\n{% endembed %}\n",
	)?;

	let mut cmd = common::bookforge_cmd();
	cmd.arg("render")
		.arg(tmp.path().join("page.md"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"{% embed url=\"https://example.com\" %}\nCaption\n{% endembed %}",
		));

	Ok(())
}

#[test]
fn render_missing_file_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::bookforge_cmd();
	cmd.arg("render")
		.arg(tmp.path().join("missing.md"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2);

	Ok(())
}
