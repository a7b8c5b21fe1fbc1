use waymark::Tree;

/// A route plus the requests that should hold once it is registered.
type Suite = &'static [(&'static str, &'static [(&'static str, &'static str)])];

/// Inserts the routes in the given order; right after each insert, runs
/// that route's requests. The expected string is either the rendered match
/// (`route k=v&k2=v2`) or the rendered error (`no match for "…"`).
fn match_in_order(suite: Suite, order: &[usize]) {
    let mut tree = Tree::new();
    for &index in order {
        let (route, requests) = suite[index];
        tree.insert(route, "value")
            .unwrap_or_else(|err| panic!("insert '{route}': {err}"));
        for &(path, expected) in requests {
            let rendered = match tree.at(path) {
                Ok(matched) => matched.to_string(),
                Err(err) => err.to_string(),
            };
            assert_eq!(rendered, expected, "request '{path}' after '{route}'");
        }
    }
}

/// Routing must not depend on registration order: every permutation of the
/// suite yields the same results. Larger suites run in declaration order
/// only.
fn match_equal(suite: Suite) {
    let count = suite.len();
    if count > 5 {
        let order: Vec<usize> = (0..count).collect();
        match_in_order(suite, &order);
        return;
    }
    let mut order: Vec<usize> = (0..count).collect();
    permute(&mut order, 0, &mut |order| match_in_order(suite, order));
}

fn match_exact(suite: Suite) {
    let order: Vec<usize> = (0..suite.len()).collect();
    match_in_order(suite, &order);
}

fn permute(order: &mut Vec<usize>, first: usize, run: &mut impl FnMut(&[usize])) {
    if first == order.len() {
        run(order);
        return;
    }
    for index in first..order.len() {
        order.swap(first, index);
        permute(order, first + 1, run);
        order.swap(first, index);
    }
}

#[test]
fn single_route() {
    match_equal(&[(
        "/hello",
        &[
            ("/hello", "/hello"),
            ("/hello/world", r#"no match for "/hello/world""#),
            ("/", r#"no match for "/""#),
            ("/hello/", "/hello"),
        ],
    )]);
}

#[test]
fn root_and_literal() {
    match_equal(&[
        (
            "/hello",
            &[
                ("/hello", "/hello"),
                ("/hello/world", r#"no match for "/hello/world""#),
                ("/hello/", "/hello"),
            ],
        ),
        ("/", &[("/", "/")]),
    ]);
}

#[test]
fn literal_beats_placeholder_beats_nothing() {
    match_equal(&[
        ("/v{version}", &[("/v2", "/v{version} version=2")]),
        (
            "/v{major}.{minor}.{patch}",
            &[(
                "/v2.0.1",
                "/v{major}.{minor}.{patch} major=2&minor=0&patch=1",
            )],
        ),
        ("/v1", &[("/v1", "/v1")]),
        ("/v2.0.0", &[("/v2.0.0", "/v2.0.0")]),
    ]);
}

#[test]
fn regexp_version_routes() {
    match_equal(&[
        ("/v{version}", &[("/v2", "/v{version} version=2")]),
        (
            "/v{major|[0-9]}.{minor|[0-9]}.{patch|[0-9]}",
            &[(
                "/v2.0.1",
                "/v{major|^[0-9]$}.{minor|^[0-9]$}.{patch|^[0-9]$} major=2&minor=0&patch=1",
            )],
        ),
        ("/v1", &[("/v1", "/v1")]),
        ("/v2.0.0", &[("/v2.0.0", "/v2.0.0")]),
    ]);
}

#[test]
fn static_segment_backtracks_into_placeholder() {
    match_equal(&[
        (
            "/users/{id}/edit",
            &[("/users/settings/edit", "/users/{id}/edit id=settings")],
        ),
        ("/users/settings", &[("/users/settings", "/users/settings")]),
        (
            "/v.{major}.{minor}",
            &[("/v.1.0", "/v.{major}.{minor} major=1&minor=0")],
        ),
        ("/v.1", &[("/v.1", "/v.1")]),
    ]);
}

#[test]
fn shared_placeholder_edge_keeps_both_delimiters() {
    match_equal(&[
        (
            "/{post_id}/comments",
            &[("/10/comments", "/{post_id}/comments post_id=10")],
        ),
        (
            "/{post_id}.{format}",
            &[("/10.json", "/{post_id}.{format} post_id=10&format=json")],
        ),
    ]);
}

#[test]
fn all_match() {
    match_equal(&[
        ("/hi", &[]),
        ("/ab", &[]),
        ("/about", &[]),
        ("/a", &[]),
        ("/α", &[]),
        ("/β", &[]),
        ("/users", &[]),
        ("/users/new", &[]),
        ("/users/id", &[]),
        ("/users/{id}", &[]),
        ("/users/{id}/edit", &[]),
        ("/posts/{post_id}/comments", &[]),
        ("/posts/{post_id}/comments/new", &[]),
        ("/posts/{post_id}/comments/{id}", &[]),
        ("/posts/{post_id}/comments/{id}/edit", &[]),
        ("/v.{version}", &[]),
        ("/v.{major}.{minor}.{patch}", &[]),
        ("/v.1", &[]),
        ("/v.2.0.0", &[]),
        ("/posts/{post_id}.{format}", &[]),
        ("/flights/{from}/{to}", &[]),
        ("/user/{user}/project/{project}", &[]),
        ("/archive/{year}/{month}", &[]),
        (
            "/search/{query}",
            &[
                ("/a", "/a"),
                ("/A", "/a"),
                ("/", r#"no match for "/""#),
                ("/hi", "/hi"),
                ("/about", "/about"),
                ("/ab", "/ab"),
                ("/abo", r#"no match for "/abo""#),
                ("/abou", r#"no match for "/abou""#),
                ("/no", r#"no match for "/no""#),
                ("/α", "/α"),
                ("/β", "/β"),
                ("/αβ", r#"no match for "/αβ""#),
                ("/users/id", "/users/id"),
                ("/users/10", "/users/{id} id=10"),
                ("/users/1", "/users/{id} id=1"),
                ("/users/a", "/users/{id} id=a"),
                ("/users/-", "/users/{id} id=-"),
                ("/users/_", "/users/{id} id=_"),
                ("/users/abc-d_e", "/users/{id} id=abc-d_e"),
                ("/users/10/edit", "/users/{id}/edit id=10"),
                ("/users/abc-d_e/edit", "/users/{id}/edit id=abc-d_e"),
                ("/posts/1/comments", "/posts/{post_id}/comments post_id=1"),
                ("/posts/10/comments", "/posts/{post_id}/comments post_id=10"),
                ("/posts/-/comments", "/posts/{post_id}/comments post_id=-"),
                (
                    "/posts/1/comments/2",
                    "/posts/{post_id}/comments/{id} post_id=1&id=2",
                ),
                (
                    "/posts/10/comments/20",
                    "/posts/{post_id}/comments/{id} post_id=10&id=20",
                ),
                (
                    "/posts/abc-d_e/comments/x-y_z",
                    "/posts/{post_id}/comments/{id} post_id=abc-d_e&id=x-y_z",
                ),
                (
                    "/posts/1/comments/2/edit",
                    "/posts/{post_id}/comments/{id}/edit post_id=1&id=2",
                ),
                ("/v.1", "/v.1"),
                ("/v.2", "/v.{version} version=2"),
                ("/v.abc", "/v.{version} version=abc"),
                ("/v.2.0.0", "/v.2.0.0"),
                (
                    "/posts/10.json",
                    "/posts/{post_id}.{format} post_id=10&format=json",
                ),
                (
                    "/flights/Berlin/Madison",
                    "/flights/{from}/{to} from=Berlin&to=Madison",
                ),
                (
                    "/archive/2021/2",
                    "/archive/{year}/{month} year=2021&month=2",
                ),
                (
                    "/search/someth!ng+in+ünìcodé",
                    "/search/{query} query=someth!ng+in+ünìcodé",
                ),
                ("/search/with spaces", "/search/{query} query=with spaces"),
                ("/search/with/slashes", r#"no match for "/search/with/slashes""#),
            ],
        ),
    ]);
}

#[test]
fn unicode_literals_match_themselves() {
    match_equal(&[
        ("/α", &[("/α", "/α")]),
        ("/β", &[("/β", "/β")]),
        (
            "/δ",
            &[("/δ", "/δ"), ("/αβ", r#"no match for "/αβ""#)],
        ),
    ]);
}

#[test]
fn optional_placeholders() {
    match_equal(&[
        (
            "/{id?}",
            &[
                ("/", "/{id?}"),
                ("/10", "/{id?} id=10"),
                ("/a", "/{id?} id=a"),
                ("/users", "/{id?} id=users"),
                ("/users/", "/{id?} id=users"),
            ],
        ),
        (
            "/users/{id}.{format?}",
            &[
                ("/users/10", r#"no match for "/users/10""#),
                ("/users/10/", r#"no match for "/users/10""#),
                ("/users/10.", "/users/{id}.{format?} id=10"),
                ("/users/10.json", "/users/{id}.{format?} id=10&format=json"),
                ("/users/10.rss", "/users/{id}.{format?} id=10&format=rss"),
                (
                    "/users/index.html",
                    "/users/{id}.{format?} id=index&format=html",
                ),
                ("/users/ü.html", "/users/{id}.{format?} id=ü&format=html"),
                (
                    "/users/index.html/more",
                    r#"no match for "/users/index.html/more""#,
                ),
            ],
        ),
        (
            "/users/v{version?}",
            &[
                ("/users/v10", "/users/v{version?} version=10"),
                ("/users/v1", "/users/v{version?} version=1"),
                ("/users/v", "/users/v{version?}"),
            ],
        ),
        (
            "/flights/{from}/{to?}",
            &[
                ("/flights/Berlin", "/flights/{from}/{to?} from=Berlin"),
                ("/flights/Berlin/", "/flights/{from}/{to?} from=Berlin"),
                (
                    "/flights/Berlin/Madison",
                    "/flights/{from}/{to?} from=Berlin&to=Madison",
                ),
            ],
        ),
    ]);
}

#[test]
fn wildcard_placeholders() {
    match_equal(&[
        (
            "/{path*}",
            &[
                ("/", "/{path*}"),
                ("/10", "/{path*} path=10"),
                ("/10/20", "/{path*} path=10/20"),
                ("/api/v", "/{path*} path=api/v"),
            ],
        ),
        (
            "/users/{id}/{file*}",
            &[
                (
                    "/users/10/dir/file.json",
                    "/users/{id}/{file*} id=10&file=dir/file.json",
                ),
                ("/users/10/dir", "/users/{id}/{file*} id=10&file=dir"),
                ("/users/10", "/users/{id}/{file*} id=10"),
            ],
        ),
        (
            "/api/v.{version*}",
            &[
                ("/api/v.2/1", "/api/v.{version*} version=2/1"),
                ("/api/v.2.1", "/api/v.{version*} version=2.1"),
                ("/api/v.", "/api/v.{version*}"),
            ],
        ),
    ]);
}

#[test]
fn placeholders_split_by_literal_separator() {
    match_equal(&[(
        "/{a}-{b}",
        &[
            ("/hello-world", "/{a}-{b} a=hello&b=world"),
            ("/a-b", "/{a}-{b} a=a&b=b"),
            ("/A-B", "/{a}-{b} a=A&b=B"),
            ("/AB", r#"no match for "/AB""#),
        ],
    )]);
}

#[test]
fn regexp_placeholders() {
    match_equal(&[(
        "/{path|[A-Z]}",
        &[
            ("/A", "/{path|^[A-Z]$} path=A"),
            ("/B", "/{path|^[A-Z]$} path=B"),
            ("/Z", "/{path|^[A-Z]$} path=Z"),
            ("/AB", r#"no match for "/AB""#),
        ],
    )]);

    match_equal(&[
        ("/{path|[A-Z]}", &[("/A", "/{path|^[A-Z]$} path=A")]),
        (
            "/{path|[0-9]}",
            &[
                ("/0", "/{path|^[0-9]$} path=0"),
                ("/9", "/{path|^[0-9]$} path=9"),
                ("/09", r#"no match for "/09""#),
            ],
        ),
        (
            "/{path|[A-Z]{2,}}",
            &[("/AB", "/{path|^[A-Z]{2,}$} path=AB")],
        ),
    ]);

    match_equal(&[
        (
            "/{name}",
            &[("/second", "/{name} name=second"), ("/09", "/{name} name=09")],
        ),
        ("/{path|[A-Z]}", &[("/A", "/{path|^[A-Z]$} path=A")]),
        (
            "/{path|[0-9]}",
            &[("/0", "/{path|^[0-9]$} path=0"), ("/9", "/{path|^[0-9]$} path=9")],
        ),
        ("/first", &[("/first", "/first")]),
        (
            "/{path|[A-Z]{2,}}",
            &[("/AB", "/{path|^[A-Z]{2,}$} path=AB")],
        ),
    ]);

    match_equal(&[
        (
            "/v{version}",
            &[
                ("/v1", "/v{version} version=1"),
                ("/valpha.beta.omega", "/v{version} version=alpha.beta.omega"),
            ],
        ),
        (
            "/v{major|[0-9]}.{minor|[0-9]}",
            &[("/v1.2", "/v{major|^[0-9]$}.{minor|^[0-9]$} major=1&minor=2")],
        ),
        (
            "/v{major|[0-9]}.{minor|[0-9]}.{patch|[0-9]}",
            &[(
                "/v1.2.3",
                "/v{major|^[0-9]$}.{minor|^[0-9]$}.{patch|^[0-9]$} major=1&minor=2&patch=3",
            )],
        ),
    ]);
}

#[test]
fn resource_routes() {
    match_equal(&[
        (
            "/{id}/edit",
            &[("/2/edit", "/{id}/edit id=2"), ("/3/edit", "/{id}/edit id=3")],
        ),
        ("/", &[("/", "/")]),
    ]);
}

#[test]
fn repeated_slashes_collapse() {
    match_equal(&[("/", &[("/", "/"), ("//", "/"), ("///", "/")])]);
}

#[test]
fn precedence_between_placeholder_kinds() {
    // progressive: each block of requests runs against the routes
    // registered so far
    match_exact(&[
        ("/", &[("/", "/")]),
        (
            "/{digits|[0-9]+}",
            &[
                ("/10", "/{digits|^[0-9]+$} digits=10"),
                ("/20", "/{digits|^[0-9]+$} digits=20"),
                ("/2", "/{digits|^[0-9]+$} digits=2"),
            ],
        ),
        (
            "/{public?}",
            &[
                ("/a", "/{public?} public=a"),
                ("/a/", "/{public?} public=a"),
                ("/A", "/{public?} public=A"),
                ("/α", "/{public?} public=α"),
            ],
        ),
        (
            "/{public*}",
            &[
                ("/a/b", "/{public*} public=a/b"),
                ("/a/b/", "/{public*} public=a/b"),
                ("/a/b/c", "/{public*} public=a/b/c"),
                ("/α/β/γ", "/{public*} public=α/β/γ"),
                ("/a/b/c/d", "/{public*} public=a/b/c/d"),
                ("/a/b/c/d/", "/{public*} public=a/b/c/d"),
            ],
        ),
    ]);

    match_equal(&[
        ("/", &[("/", "/")]),
        (
            "/{digits|[0-9]+}",
            &[
                ("/10", "/{digits|^[0-9]+$} digits=10"),
                ("/2", "/{digits|^[0-9]+$} digits=2"),
            ],
        ),
        (
            "/{public*}",
            &[
                ("/a", "/{public*} public=a"),
                ("/A", "/{public*} public=A"),
                ("/α", "/{public*} public=α"),
                ("/a/b", "/{public*} public=a/b"),
                ("/a/b/c", "/{public*} public=a/b/c"),
                ("/a/b/c/d/", "/{public*} public=a/b/c/d"),
            ],
        ),
    ]);

    match_equal(&[
        ("/", &[("/", "/")]),
        (
            "/{digits|[0-9]+}",
            &[
                ("/10", "/{digits|^[0-9]+$} digits=10"),
                ("/2", "/{digits|^[0-9]+$} digits=2"),
            ],
        ),
        (
            "/{public?}",
            &[
                ("/a", "/{public?} public=a"),
                ("/a/", "/{public?} public=a"),
                ("/A", "/{public?} public=A"),
                ("/α", "/{public?} public=α"),
            ],
        ),
    ]);
}

#[test]
fn empty_tree_matches_nothing() {
    let tree: Tree<&str> = Tree::new();
    assert_eq!(
        tree.at("/").unwrap_err().to_string(),
        r#"no match for "/""#
    );
    assert_eq!(
        tree.at("/a").unwrap_err().to_string(),
        r#"no match for "/a""#
    );
    assert_eq!(tree.at("").unwrap_err().to_string(), r#"no match for """#);
}

#[test]
fn split_point_is_not_routable() {
    let mut tree = Tree::new();
    tree.insert("/hello", "h").unwrap();
    tree.insert("/world", "w").unwrap();
    let err = tree.at("/").unwrap_err();
    assert_eq!(err, waymark::MatchError::NotFound { path: "/".into() });
}

#[test]
fn match_record_fields() {
    let mut tree = Tree::new();
    tree.insert("/", "index.html").unwrap();
    tree.insert("/users/{id}", "users/show.html").unwrap();
    tree.insert("/{owner}/{repo}/{branch}/{path*}", "repo.html")
        .unwrap();

    let matched = tree.at("/mm/routes/main/internal/parser/parser.go").unwrap();
    assert_eq!(matched.path, "/mm/routes/main/internal/parser/parser.go");
    assert_eq!(matched.route, "/{owner}/{repo}/{branch}/{path*}");
    assert_eq!(*matched.value, "repo.html");
    let slots: Vec<_> = matched.slots.iter().collect();
    assert_eq!(
        slots,
        [
            ("owner", "mm"),
            ("repo", "routes"),
            ("branch", "main"),
            ("path", "internal/parser/parser.go"),
        ]
    );
}

#[test]
fn captures_preserve_input_case() {
    let mut tree = Tree::new();
    tree.insert("/files/{name}", ()).unwrap();
    let matched = tree.at("/FILES/ReadMe.TXT").unwrap();
    assert_eq!(matched.route, "/files/{name}");
    assert_eq!(matched.slots.get("name"), Some("ReadMe.TXT"));
}
