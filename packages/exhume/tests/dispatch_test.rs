//! End-to-end dispatch tests over the inventory fixture.
//!
//! The fixture holds two books priced 15 and 12 and three DVDs priced 8, 4
//! and 22, two of which are on sale.

use std::cell::{Cell, RefCell};
use std::fs;
use std::io::Write;
use std::path::Path as FsPath;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use exhume::{
    Dispatcher, ExhumeError, FormatError, HandlerSet, ParseOptions, RegistrationError, Value,
    ValueKind,
};

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = FsPath::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn inventory() -> String {
    load_fixture("inventory.xml")
}

/// Sum every `pattern` price under `root` (empty for unscoped).
fn sum_prices(root: &str, pattern: &str) -> i64 {
    let total = Cell::new(0);
    {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(HandlerSet::rooted(root).on_end(pattern, |price: i64| {
                total.set(total.get() + price);
                Ok(())
            }))
            .unwrap();
        dispatcher.parse_str(&inventory()).unwrap();
    }
    total.get()
}

#[test]
fn test_absolute_book_prices() {
    assert_eq!(sum_prices("", "/Inventory/Books/Book/Price"), 27);
}

#[test]
fn test_scoped_dvd_prices() {
    assert_eq!(sum_prices("/Inventory/DVDs/DVD", "Price"), 34);
}

#[test]
fn test_root_with_trailing_separator() {
    assert_eq!(sum_prices("/Inventory/DVDs/DVD/", "Price"), 34);
}

#[test]
fn test_unscoped_relative_prices() {
    assert_eq!(sum_prices("", "Price"), 61);
}

#[test]
fn test_on_sale_titles() {
    let on_sale = Cell::new(false);
    let titles = RefCell::new(Vec::new());
    {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(
                HandlerSet::new()
                    .on_start("DVD", |dvd| {
                        let flag = dvd.attribute_value("onSale").unwrap_or("false");
                        on_sale.set(flag.parse::<bool>()?);
                        Ok(())
                    })
                    .on_end("DVD/Title", |title: String| {
                        if on_sale.get() {
                            titles.borrow_mut().push(title);
                        }
                        Ok(())
                    }),
            )
            .unwrap();
        dispatcher.parse_str(&inventory()).unwrap();
    }
    assert_eq!(titles.into_inner(), ["Chinatown", "Pi"]);
}

#[test]
fn test_handlers_run_in_registration_order() {
    let calls = RefCell::new(Vec::new());
    {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(
                HandlerSet::new()
                    .on_end_element("Price", |_| {
                        calls.borrow_mut().push("relative");
                        Ok(())
                    })
                    .on_end_element("/Inventory/DVDs/DVD/Price", |_| {
                        calls.borrow_mut().push("absolute");
                        Ok(())
                    })
                    .on_end_element("Price", |_| {
                        calls.borrow_mut().push("relative again");
                        Ok(())
                    }),
            )
            .unwrap();
        dispatcher
            .parse_str("<Inventory><DVDs><DVD><Price>1</Price></DVD></DVDs></Inventory>")
            .unwrap();
    }
    assert_eq!(
        calls.into_inner(),
        ["relative", "absolute", "relative again"]
    );
}

#[test]
fn test_typed_values() {
    let decimal_total = RefCell::new(BigDecimal::from(0));
    let published = RefCell::new(Vec::new());
    let dynamic = RefCell::new(Vec::new());
    {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(
                HandlerSet::new()
                    .on_end("Price", |price: BigDecimal| {
                        *decimal_total.borrow_mut() += price;
                        Ok(())
                    })
                    .on_end("Published", |date: NaiveDate| {
                        published.borrow_mut().push(date);
                        Ok(())
                    })
                    .on_end_value("/Inventory/DVDs/DVD/Price", "double", |value| {
                        dynamic.borrow_mut().push(value);
                        Ok(())
                    }),
            )
            .unwrap();
        dispatcher.parse_str(&inventory()).unwrap();
    }

    assert_eq!(decimal_total.into_inner(), BigDecimal::from(61));
    assert_eq!(
        published.into_inner(),
        [
            NaiveDate::from_ymd_opt(1994, 10, 21).unwrap(),
            NaiveDate::from_ymd_opt(1988, 4, 1).unwrap(),
        ]
    );
    assert_eq!(
        dynamic.into_inner(),
        [Value::Float(8.0), Value::Float(4.0), Value::Float(22.0)]
    );
}

#[test]
fn test_boolean_literals() {
    let flags = RefCell::new(Vec::new());
    {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(HandlerSet::new().on_end("flag", |flag: bool| {
                flags.borrow_mut().push(flag);
                Ok(())
            }))
            .unwrap();
        dispatcher
            .parse_str("<flags><flag>1</flag><flag>true</flag><flag>0</flag><flag>false</flag></flags>")
            .unwrap();
    }
    assert_eq!(flags.into_inner(), [true, true, false, false]);

    let mut dispatcher = Dispatcher::new();
    dispatcher
        .register(HandlerSet::new().on_end("flag", |_: bool| Ok(())))
        .unwrap();
    let err = dispatcher
        .parse_str("<flags><flag>yes</flag></flags>")
        .unwrap_err();
    assert!(matches!(err, ExhumeError::Conversion { .. }));
}

#[test]
fn test_absolute_leaf_under_root_is_rejected() {
    let mut dispatcher = Dispatcher::new();
    let err = dispatcher
        .register(HandlerSet::rooted("/Inventory/Books/Book").on_end("/Title", |_: String| Ok(())))
        .unwrap_err();
    assert_eq!(
        err,
        RegistrationError::AbsoluteLeaf {
            root: "/Inventory/Books/Book".to_string(),
            leaf: "/Title".to_string(),
        }
    );
    assert!(dispatcher.end_registry().is_empty());
}

#[test]
fn test_unsupported_value_type_is_rejected() {
    let mut dispatcher = Dispatcher::new();
    let err = dispatcher
        .register(
            HandlerSet::new()
                .on_end("Title", |_: String| Ok(()))
                .on_end_value("Price", "money", |_| Ok(())),
        )
        .unwrap_err();
    assert_eq!(err, RegistrationError::UnsupportedValueType("money".to_string()));
    // Nothing from a rejected set is kept.
    assert!(dispatcher.end_registry().is_empty());
}

#[test]
fn test_malformed_pattern_is_rejected() {
    let err = Dispatcher::with_handlers(
        ParseOptions::default(),
        [HandlerSet::new().on_start("Inventory//Book", |_| Ok(()))],
    )
    .unwrap_err();
    assert_eq!(
        err,
        RegistrationError::Pattern(FormatError::EmptySegment("Inventory//Book".to_string()))
    );
}

/// Parse the inventory with a single `T` handler on `Title` and return the
/// error it must fail with.
fn parse_titles_as<T: exhume::FromElementValue + 'static>() -> ExhumeError {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .register(HandlerSet::new().on_end("Title", |_: T| Ok(())))
        .unwrap();
    dispatcher.parse_str(&inventory()).unwrap_err()
}

#[test]
fn test_non_conforming_titles_abort_parse() {
    for (err, kind) in [
        (parse_titles_as::<i64>(), ValueKind::Integer),
        (parse_titles_as::<NaiveDate>(), ValueKind::Date),
        (parse_titles_as::<BigDecimal>(), ValueKind::Decimal),
        (parse_titles_as::<bool>(), ValueKind::Boolean),
    ] {
        match err {
            ExhumeError::Conversion { path, source } => {
                assert_eq!(path, "/Inventory/Books/Book/Title");
                assert_eq!(source.kind, kind);
                assert_eq!(source.text, "Design Patterns");
            }
            other => panic!("unexpected error for {kind}: {other}"),
        }
    }
}

#[test]
fn test_deep_document_with_many_wildcards() {
    let depth = 1_000;
    let mut xml = "<a>".repeat(depth);
    xml.push_str("<b>end</b>");
    xml.push_str(&"</a>".repeat(depth));

    let found = RefCell::new(Vec::new());
    {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(
                HandlerSet::new()
                    .on_end("a/**/a/**/a/**/a/**/b", |text: String| {
                        found.borrow_mut().push(text);
                        Ok(())
                    })
                    .on_end_element("a/**/a/**/a/**/a/**/c", |_| {
                        Err("no element c in the document".into())
                    }),
            )
            .unwrap();
        dispatcher.parse_str(&xml).unwrap();
    }
    assert_eq!(found.into_inner(), ["end"]);
}

#[test]
fn test_conversion_failure_aborts_parse() {
    let prices = Cell::new(0);
    let err = {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(
                HandlerSet::new()
                    .on_end("Title", |_: f64| Ok(()))
                    .on_end("Price", |_: i64| {
                        prices.set(prices.get() + 1);
                        Ok(())
                    }),
            )
            .unwrap();
        dispatcher.parse_str(&inventory()).unwrap_err()
    };

    match err {
        ExhumeError::Conversion { path, source } => {
            assert_eq!(path, "/Inventory/Books/Book/Title");
            assert_eq!(source.kind, ValueKind::Float);
            assert_eq!(source.text, "Design Patterns");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(prices.get(), 0);
}

#[test]
fn test_handler_error_carries_cause() {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .register(HandlerSet::new().on_end("Price", |price: i64| {
            if price > 20 {
                return Err(format!("price {price} over budget").into());
            }
            Ok(())
        }))
        .unwrap();

    let err = dispatcher.parse_str(&inventory()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Handler failed at /Inventory/DVDs/DVD/Price: price 22 over budget"
    );
    let source = std::error::Error::source(&err).map(ToString::to_string);
    assert_eq!(source.as_deref(), Some("price 22 over budget"));
}

#[test]
fn test_scan_count_equals_distinct_paths() {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .register(HandlerSet::new().on_end("Price", |_: i64| Ok(())))
        .unwrap();
    dispatcher.parse_str(&inventory()).unwrap();

    // Inventory, Books, Book, Book/Title, Book/Price, Book/Published,
    // DVDs, DVD, DVD/Title, DVD/Price
    assert_eq!(dispatcher.end_registry().scan_count(), 10);
    assert_eq!(dispatcher.stats().elements, 20);
    assert_eq!(dispatcher.stats().end_invocations, 5);

    // A second parse of the same shape hits the cache throughout.
    dispatcher.parse_str(&inventory()).unwrap();
    assert_eq!(dispatcher.end_registry().scan_count(), 10);
    assert_eq!(dispatcher.stats().end_invocations, 5);
}

#[test]
fn test_wildcards() {
    let titles = RefCell::new(Vec::new());
    let prices = Cell::new(0);
    let direct = Cell::new(0);
    {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(
                HandlerSet::new()
                    .on_end("/Inventory/*/DVD/Title", |title: String| {
                        titles.borrow_mut().push(title);
                        Ok(())
                    })
                    .on_end("Inventory/**/Price", |price: i64| {
                        prices.set(prices.get() + price);
                        Ok(())
                    })
                    .on_start("/Inventory/**/DVDs", |_| {
                        direct.set(direct.get() + 1);
                        Ok(())
                    }),
            )
            .unwrap();
        dispatcher.parse_str(&inventory()).unwrap();
    }
    assert_eq!(titles.into_inner(), ["Chinatown", "Vertigo", "Pi"]);
    assert_eq!(prices.get(), 61);
    assert_eq!(direct.get(), 1);
}

#[test]
fn test_namespaced_document() {
    let xml = r#"<inv:Inventory xmlns:inv="urn:example:inventory" xmlns:m="urn:example:meta">
        <inv:DVD m:rating="R"><inv:Title>Chinatown</inv:Title></inv:DVD>
        <inv:DVD m:rating="PG"><inv:Title>Pi</inv:Title></inv:DVD>
    </inv:Inventory>"#;

    let ratings = RefCell::new(Vec::new());
    let namespaces = RefCell::new(Vec::new());
    {
        let mut dispatcher = Dispatcher::with_options(ParseOptions::new().with_namespaces(true));
        dispatcher
            .register(
                HandlerSet::rooted("/inv:Inventory")
                    .on_start("inv:DVD", |dvd| {
                        let rating = dvd.attribute_value_ns("urn:example:meta", "rating");
                        ratings.borrow_mut().push(rating.map(String::from));
                        Ok(())
                    })
                    .on_end_element("inv:DVD/inv:Title", |title| {
                        namespaces.borrow_mut().push(format!(
                            "{}|{}|{}",
                            title.namespace_uri().unwrap_or("-"),
                            title.local_name(),
                            title.value()
                        ));
                        Ok(())
                    }),
            )
            .unwrap();
        dispatcher.parse_str(xml).unwrap();
    }

    assert_eq!(
        ratings.into_inner(),
        [Some("R".to_string()), Some("PG".to_string())]
    );
    assert_eq!(
        namespaces.into_inner(),
        [
            "urn:example:inventory|Title|Chinatown",
            "urn:example:inventory|Title|Pi"
        ]
    );
}

#[test]
fn test_text_assembly() {
    let values = RefCell::new(Vec::new());
    {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(HandlerSet::new().on_end("note", |text: String| {
                values.borrow_mut().push(text);
                Ok(())
            }))
            .unwrap();
        dispatcher
            .parse_str(concat!(
                "<notes>",
                "<note>Tom &amp; Jerry &lt;3</note>",
                "<note>before <![CDATA[<raw> & ]]>after</note>",
                "<note/>",
                "<note><!-- hidden -->shown</note>",
                "</notes>"
            ))
            .unwrap();
    }
    assert_eq!(
        values.into_inner(),
        ["Tom & Jerry <3", "before <raw> & after", "", "shown"]
    );
}

#[test]
fn test_nested_text_is_not_shared() {
    let values = RefCell::new(Vec::new());
    {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(HandlerSet::new().on_end_element("p", |p| {
                values.borrow_mut().push(p.value().to_string());
                Ok(())
            }))
            .unwrap();
        dispatcher
            .parse_str("<p>outer <p>inner</p> tail</p>")
            .unwrap();
    }
    assert_eq!(values.into_inner(), ["inner", "outer  tail"]);
}

#[test]
fn test_depth_limit() {
    let mut dispatcher = Dispatcher::with_options(ParseOptions::new().with_max_depth(3));
    dispatcher.parse_str("<a><b><c/></b></a>").unwrap();

    let err = dispatcher.parse_str("<a><b><c><d/></c></b></a>").unwrap_err();
    match err {
        ExhumeError::DepthLimit { limit, element } => {
            assert_eq!(limit, 3);
            assert_eq!(element, "d");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_dispatcher_reuse_after_failure() {
    let titles = RefCell::new(Vec::new());
    {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(HandlerSet::new().on_end("Title", |title: String| {
                titles.borrow_mut().push(title);
                Ok(())
            }))
            .unwrap();

        assert!(dispatcher.parse_str("<a><Title>lost</a>").is_err());
        assert_eq!(dispatcher.depth(), 2);

        dispatcher.parse_str("<b><Title>kept</Title></b>").unwrap();
        assert_eq!(dispatcher.depth(), 0);
    }
    assert_eq!(titles.into_inner(), ["kept"]);
}

#[test]
fn test_parse_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(inventory().as_bytes()).unwrap();

    let count = Cell::new(0);
    {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(HandlerSet::new().on_start("Book", |_| {
                count.set(count.get() + 1);
                Ok(())
            }))
            .unwrap();
        dispatcher.parse_file(file.path()).unwrap();
    }
    assert_eq!(count.get(), 2);
}

#[test]
fn test_parse_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let mut dispatcher = Dispatcher::new();
    let err = dispatcher
        .parse_file(dir.path().join("missing.xml"))
        .unwrap_err();
    assert!(matches!(err, ExhumeError::Io(_)));
}

#[test]
fn test_parse_reader() {
    let xml = inventory();
    let total = Cell::new(0);
    {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register(HandlerSet::rooted("/Inventory/Books/Book").on_end(
                "Price",
                |price: i64| {
                    total.set(total.get() + price);
                    Ok(())
                },
            ))
            .unwrap();
        dispatcher
            .parse_reader(std::io::BufReader::with_capacity(16, xml.as_bytes()))
            .unwrap();
    }
    assert_eq!(total.get(), 27);
}
