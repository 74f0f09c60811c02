//! Static catalog of templated page sources.
//!
//! Each [`SourceDefinition`] is a URL template with a single `{q}`
//! placeholder plus the [`ExtractionRule`] chosen for it when the registry
//! is built. Sources without curated selectors use generic extraction.

/// Placeholder replaced by the percent-encoded query.
pub const QUERY_PLACEHOLDER: &str = "{q}";

/// A curated (title selector, link selector) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorPair {
    pub title: String,
    pub link: String,
}

impl SelectorPair {
    pub fn new(title: &str, link: &str) -> Self {
        Self {
            title: title.to_owned(),
            link: link.to_owned(),
        }
    }
}

/// How listings are pulled out of a source's page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionRule {
    /// Curated selector pairs, applied in order, paired positionally.
    Structured(Vec<SelectorPair>),
    /// Fallback structural heuristics for unknown page shapes.
    Generic,
}

/// One named upstream endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDefinition {
    pub name: String,
    pub url_template: String,
    pub rule: ExtractionRule,
}

impl SourceDefinition {
    /// A source scraped with the generic extractor.
    pub fn generic(name: &str, url_template: &str) -> Self {
        Self {
            name: name.to_owned(),
            url_template: url_template.to_owned(),
            rule: ExtractionRule::Generic,
        }
    }

    /// A source scraped with curated selector pairs.
    pub fn structured(name: &str, url_template: &str, pairs: Vec<SelectorPair>) -> Self {
        Self {
            name: name.to_owned(),
            url_template: url_template.to_owned(),
            rule: ExtractionRule::Structured(pairs),
        }
    }

    /// Substitute the already-encoded query into the template.
    pub fn url_for(&self, encoded_query: &str) -> String {
        self.url_template.replace(QUERY_PLACEHOLDER, encoded_query)
    }
}

/// Templated page sources, in registry order.
const TEMPLATED_SOURCES: &[(&str, &str)] = &[
    // Major B2B
    ("Alibaba", "https://www.alibaba.com/trade/search?fsb=y&IndexArea=product_en&searchText={q}"),
    ("Made-in-China", "https://www.made-in-china.com/search?word={q}"),
    ("GlobalSources", "https://www.globalsources.com/searchList?query={q}"),
    ("1688 (via Baidu)", "https://www.baidu.com/s?wd={q}+site:1688.com"),
    ("HKTDC", "https://sourcing.hktdc.com/Search-Product?keyword={q}"),
    ("ECVV", "https://www.ecvv.com/catalog/{q}.html"),
    ("ECER", "https://www.ecer.com/search?kw={q}"),
    ("HC360", "https://s.hc360.com/seller/search.html?kwd={q}"),
    ("DHgate", "https://www.dhgate.com/wholesale/search.do?act=search&searchkey={q}"),
    ("YiwuGo", "https://en.yiwugo.com/search/{q}.html"),
    ("TradeKey", "https://www.tradekey.com/suppliers/{q}.html"),
    ("ExportHub", "https://www.exporthub.com/search?q={q}"),
    ("TradeWheel", "https://www.tradewheel.com/search/{q}/"),
    ("En.China.cn", "https://en.china.cn/search.html?searchKey={q}"),
    ("Hisupplier", "https://www.hisupplier.com/wholesale/{q}/"),
    ("Epoly", "https://www.etwinternational.com/search?kw={q}"),
    ("Globalspec", "https://www.globalspec.com/Search/Results?query={q}"),
    ("ThomasNet", "https://www.thomasnet.com/search.html?what={q}"),
    ("Kompass", "https://us.kompass.com/en/searchCompanies/companies/{q}/"),
    ("Qcc (companies)", "https://www.qcc.com/web/search?key={q}"),
    ("Tianyancha", "https://www.tianyancha.com/search?key={q}"),
    // Chinese marketplaces
    ("JD", "https://search.jd.com/Search?keyword={q}"),
    ("Taobao", "https://s.taobao.com/search?q={q}"),
    ("Pinduoduo", "https://mobile.yangkeduo.com/search_result.html?search_key={q}"),
    // Verticals, encyclopaedias and search engines
    ("MFG", "https://www.mfg.com/en/search/?q={q}"),
    ("AliExpress B2B", "https://www.aliexpress.com/wholesale?SearchText={q}"),
    ("Globalsources Verified", "https://www.globalsources.com/searchList?query={q}&verifiedSupplier=true"),
    ("Baidu Baike", "https://baike.baidu.com/search?word={q}"),
    ("Sogou", "https://www.sogou.com/web?query={q}"),
    ("Bing China", "https://cn.bing.com/search?q={q}"),
    ("Google (backup)", "https://www.google.com/search?q={q}"),
    // More B2B directories and aggregators
    ("E-WorldTrade", "https://www.eworldtrade.com/search/{q}/"),
    ("China.cn", "https://www.china.cn/search.html?searchKey={q}"),
    ("B2BManufactures", "https://www.manufacturers.com.tw/search.php?words={q}"),
    ("Maker-In-China", "https://www.maker-in-china.com/search.html?kw={q}"),
    ("Manufacturers Directory", "https://www.manufacturersdirectory.com/search?query={q}"),
    ("IndiaMART", "https://dir.indiamart.com/search.mp?ss={q}"),
    ("TradeIndia", "https://www.tradeindia.com/search.html?search_text={q}"),
    ("ECPlaza", "https://www.ecplaza.net/search/1?keyword={q}"),
    ("YellowPages", "https://www.yellowpages.com/search?search_terms={q}"),
    ("B2Brazil", "https://b2brazil.com/hotsite/search?term={q}"),
    ("B2BMit", "https://www.b2bmit.com/search.html?q={q}"),
    ("Globalsources Suppliers", "https://www.globalsources.com/suppliers?query={q}"),
    ("AliBaba Suppliers", "https://www.alibaba.com/company_directory/search/{q}.html"),
    ("CantonFair", "https://www.cantonfair.org.cn/en-US/search?key={q}"),
    ("HKTDC Suppliers", "https://sourcing.hktdc.com/en/supplier-search/{q}"),
    ("Europages", "https://www.europages.com/companies/{q}.html"),
    ("Kompass CN", "https://cn.kompass.com/en/searchCompanies/companies/{q}/"),
    ("Made-in-China Companies", "https://www.made-in-china.com/company-search/?word={q}"),
    ("MIC Verified", "https://www.made-in-china.com/company-search/?word={q}&select=verified"),
    ("GlobalMarket", "https://www.globalmarket.com/search/{q}.html"),
    ("EtradeAsia", "https://www.etradeasia.com/search?keyword={q}"),
    ("Mawoo", "https://www.made-in-asia.net/search?kw={q}"),
    ("EveryChina", "https://www.everychina.com/search.html?kw={q}"),
    ("ChinaProducts", "https://www.china-products-manufacturers.com/search?keyword={q}"),
    ("Crov", "https://www.crov.com/search?q={q}"),
    ("DiyTrade", "https://www.diytrade.com/china/search/products.do?keyword={q}"),
    ("Okchem", "https://www.okchem.com/search?keyword={q}"),
    ("ChemNet", "https://www.chemnet.com/global/en/search.html?keyword={q}"),
    ("Food2China", "https://www.food2china.com/search?keyword={q}"),
    ("PharmaSources", "https://www.pharmasources.com/searchResult?keyword={q}"),
    ("MedicaTradeFair", "https://www.medica-tradefair.com/vis/v1/en/search?term={q}"),
    ("HKTDC Products", "https://sourcing.hktdc.com/Search-Product?keyword={q}&productonly=1"),
    // Social landing pages
    ("Xiaohongshu", "https://www.xiaohongshu.com/search_result?keyword={q}"),
    ("Weixin", "https://weixin.sogou.com/weixin?type=2&query={q}"),
    ("Bilibili", "https://search.bilibili.com/all?keyword={q}"),
    ("Weibo", "https://s.weibo.com/weibo?q={q}"),
    ("LinkedIn", "https://www.linkedin.com/search/results/companies/?keywords={q}"),
    ("Pinterest", "https://www.pinterest.com/search/pins/?q={q}"),
    ("YouTube", "https://www.youtube.com/results?search_query={q}"),
];

/// Curated selectors for sources with predictable, narrow markup.
const CURATED_SELECTORS: &[(&str, &str, &str)] = &[
    ("Alibaba", ".organic-gallery-title", ".organic-gallery-title a"),
    ("Made-in-China", ".company-name a", ".company-name a"),
    ("GlobalSources", "a.gs-product-card__name", "a.gs-product-card__name"),
    ("1688 (via Baidu)", "h3.t a", "h3.t a"),
    ("HKTDC", ".product-name a, .cmpny-name a", ".product-name a, .cmpny-name a"),
    ("ECER", ".pro-title a, .supplier-name a", ".pro-title a, .supplier-name a"),
    ("ECVV", ".pro-title a, .company a", ".pro-title a, .company a"),
    ("HC360", ".search-list .title a", ".search-list .title a"),
    ("DHgate", ".item-title a", ".item-title a"),
    ("YiwuGo", ".title a", ".title a"),
    ("TradeWheel", ".item-title a", ".item-title a"),
    ("ExportHub", "h4.media-heading a", "h4.media-heading a"),
];

/// An ordered, immutable set of sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRegistry {
    sources: Vec<SourceDefinition>,
}

impl SourceRegistry {
    /// Build a registry from explicit definitions, keeping the first of any
    /// duplicate name.
    pub fn from_definitions(definitions: Vec<SourceDefinition>) -> Self {
        let mut sources: Vec<SourceDefinition> = Vec::with_capacity(definitions.len());
        for def in definitions {
            if sources.iter().any(|s| s.name == def.name) {
                tracing::warn!(source = %def.name, "duplicate source name ignored");
                continue;
            }
            sources.push(def);
        }
        Self { sources }
    }

    /// The full built-in catalog. Curated selectors are attached by name.
    pub fn builtin() -> Self {
        let definitions = TEMPLATED_SOURCES
            .iter()
            .map(|(name, template)| {
                match CURATED_SELECTORS.iter().find(|(n, _, _)| n == name) {
                    Some((_, title, link)) => SourceDefinition::structured(
                        name,
                        template,
                        vec![SelectorPair::new(title, link)],
                    ),
                    None => SourceDefinition::generic(name, template),
                }
            })
            .collect();
        Self::from_definitions(definitions)
    }

    /// The small degraded-mode subset tried when a full run finds nothing.
    pub fn fallback() -> Self {
        Self::from_definitions(vec![
            SourceDefinition::structured(
                "Alibaba",
                "https://www.alibaba.com/trade/search?fsb=y&IndexArea=product_en&searchText={q}",
                vec![SelectorPair::new(
                    "h2.title, .organic-gallery-title",
                    "h2.title a, .organic-gallery-title a",
                )],
            ),
            SourceDefinition::structured(
                "Made-in-China",
                "https://www.made-in-china.com/search?word={q}",
                vec![SelectorPair::new(".company-name a", ".company-name a")],
            ),
            SourceDefinition::structured(
                "GlobalSources",
                "https://www.globalsources.com/searchList?query={q}",
                vec![SelectorPair::new(
                    "a.gs-product-card__name",
                    "a.gs-product-card__name",
                )],
            ),
            SourceDefinition::structured(
                "1688",
                "https://www.baidu.com/s?wd={q}+site:1688.com",
                vec![SelectorPair::new("h3.t a", "h3.t a")],
            ),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceDefinition> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SourceDefinition> {
        self.sources.iter().find(|s| s.name == name)
    }
}
