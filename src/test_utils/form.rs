use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("want a form, got none")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let got = form
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("want form with attribute {attribute}, got none"));

    assert_eq!(
        got, endpoint,
        "want form with attribute {attribute}=\"{endpoint}\", got {got:?}"
    );
}

/// Find the required input called `name` and check its type.
#[track_caller]
fn must_get_required_input<'a>(form: &ElementRef<'a>, name: &str, type_: &str) -> ElementRef<'a> {
    let input = form
        .select(&Selector::parse(&format!("input[name='{name}']")).unwrap())
        .next()
        .unwrap_or_else(|| panic!("want input with name {name:?}, got none"));

    let got_type = input.value().attr("type").unwrap_or_default();
    assert_eq!(
        got_type, type_,
        "want input {name:?} with type {type_:?}, got {got_type:?}"
    );
    assert!(
        input.value().attr("required").is_some(),
        "want input {name:?} to have the required attribute, got none"
    );

    input
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    must_get_required_input(form, name, type_);
}

#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    let input = must_get_required_input(form, name, type_);

    let got_value = input.value().attr("value").unwrap_or_default();
    assert_eq!(
        got_value, value,
        "want input {name:?} with value {value:?}, got {got_value:?}"
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let submit_button = form
        .select(&Selector::parse("button").unwrap())
        .next()
        .expect("want a submit button, got none");

    let got_type = submit_button.value().attr("type").unwrap_or_default();
    assert_eq!(
        got_type, "submit",
        "want button with type=\"submit\", got {got_type:?}"
    );
}
